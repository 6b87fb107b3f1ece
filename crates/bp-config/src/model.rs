//! Classifier configuration schema.
//!
//! Every field has a default matching the reference data set: prior 0.5,
//! speed bins of width 0.5 (scale 2), 100 variation bins, `NaN` as the
//! missing marker and batches of ten objects.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClassifierConfig {
    pub schema_version: String,
    pub prior: PriorSettings,
    pub speed: SpeedSettings,
    pub variation: VariationSettings,
    pub data: DataSettings,
    pub batch: BatchSettings,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            prior: PriorSettings::default(),
            speed: SpeedSettings::default(),
            variation: VariationSettings::default(),
            data: DataSettings::default(),
            batch: BatchSettings::default(),
        }
    }
}

/// Initial belief before any observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PriorSettings {
    /// P(plane) before the first observation. The bird-only recurrence starts
    /// from the complement.
    pub plane: f64,
}

impl Default for PriorSettings {
    fn default() -> Self {
        PriorSettings { plane: 0.5 }
    }
}

impl PriorSettings {
    pub fn bird(&self) -> f64 {
        1.0 - self.plane
    }
}

/// Speed channel discretization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SpeedSettings {
    /// Multiplier applied before truncation: bin = floor(bin_scale * speed).
    pub bin_scale: f64,
    /// Width of speed tables built by `train-speed`. Loaded tables keep the
    /// width of their file.
    pub table_width: usize,
    pub out_of_range: OutOfRangePolicy,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        SpeedSettings {
            bin_scale: 2.0,
            table_width: 400,
            out_of_range: OutOfRangePolicy::Undefined,
        }
    }
}

/// What a token outside its table's bins does to a recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// The posterior becomes undefined and the verdict falls back.
    #[default]
    Undefined,
    /// The token is treated as a missing observation.
    Skip,
}

/// How the variation channel remembers the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VariationTracking {
    /// A missing reading clears the previous value; a genuine 0.0 reading is
    /// a valid previous value.
    #[default]
    Strict,
    /// A missing reading stores 0.0 and a previous value of exactly 0.0 means
    /// "no previous value". Matches tables produced by older tooling.
    Legacy,
}

impl std::fmt::Display for VariationTracking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariationTracking::Strict => write!(f, "strict"),
            VariationTracking::Legacy => write!(f, "legacy"),
        }
    }
}

impl std::str::FromStr for VariationTracking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(VariationTracking::Strict),
            "legacy" => Ok(VariationTracking::Legacy),
            _ => Err(format!("unknown variation tracking: {}", s)),
        }
    }
}

/// Variation channel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VariationSettings {
    /// Number of variation bins (0..table_width).
    pub table_width: usize,
    pub tracking: VariationTracking,
    pub out_of_range: OutOfRangePolicy,
}

impl Default for VariationSettings {
    fn default() -> Self {
        VariationSettings {
            table_width: 100,
            tracking: VariationTracking::Strict,
            out_of_range: OutOfRangePolicy::Undefined,
        }
    }
}

/// Input file conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DataSettings {
    /// Tokens in speed files that denote a missing reading.
    pub missing_markers: Vec<String>,
    /// Integer written to (and recognized in) variation files for a missing value.
    pub variation_missing_value: i64,
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            missing_markers: vec!["NaN".to_string()],
            variation_missing_value: -1,
        }
    }
}

impl DataSettings {
    /// Whether `token` is one of the configured missing markers.
    pub fn is_missing_marker(&self, token: &str) -> bool {
        self.missing_markers.iter().any(|m| m == token)
    }
}

/// Batch sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchSettings {
    /// Objects classified per run; 0 means every line of the speed file.
    pub objects: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings { objects: 10 }
    }
}

impl ClassifierConfig {
    /// Load a config from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a config from a JSON string. Missing sections take defaults.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }
}
