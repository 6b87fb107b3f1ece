//! Bird/plane classifier configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the classifier config file
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots embedded in JSON reports

pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use model::{
    BatchSettings, ClassifierConfig, DataSettings, OutOfRangePolicy, PriorSettings,
    SpeedSettings, VariationSettings, VariationTracking,
};
pub use resolve::{load_config, resolve_config_path, ConfigSource, ResolvedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
