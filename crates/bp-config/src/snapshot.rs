//! Configuration snapshots for reproducible reports.
//!
//! A snapshot records which configuration a run used so a JSON report can be
//! traced back to the exact settings that produced it.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::VariationTracking;
use crate::resolve::ResolvedConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Where the configuration came from.
    pub source: String,

    /// Path of the config file, if any.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the effective configuration serialized as JSON.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSummary {
    pub prior_plane: f64,
    pub speed_bin_scale: f64,
    pub variation_table_width: usize,
    pub variation_tracking: VariationTracking,
    pub batch_objects: usize,
}

impl ConfigSnapshot {
    /// Create a snapshot from a resolved configuration.
    pub fn new(resolved: &ResolvedConfig) -> Self {
        let config = &resolved.config;
        // Hash the effective settings so defaults filled in by serde are covered.
        let canonical = serde_json::to_string(config).unwrap_or_default();
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            source: resolved.source.to_string(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
            config_hash: hash_content(&canonical),
            summary: ConfigSummary {
                prior_plane: config.prior.plane,
                speed_bin_scale: config.speed.bin_scale,
                variation_table_width: config.variation.table_width,
                variation_tracking: config.variation.tracking,
                batch_objects: config.batch.objects,
            },
        }
    }

    /// Check if two snapshots carry the same effective configuration.
    pub fn same_config(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
