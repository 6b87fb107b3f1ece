//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::model::ClassifierConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

/// Validate a classifier configuration semantically.
pub fn validate_config(config: &ClassifierConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    // A prior of exactly 0 or 1 can never be moved by evidence.
    let prior = config.prior.plane;
    if !prior.is_finite() || prior <= 0.0 || prior >= 1.0 {
        return Err(invalid(
            "prior.plane",
            format!("Must be in (0, 1), got {}", prior),
        ));
    }

    let scale = config.speed.bin_scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(invalid(
            "speed.bin_scale",
            format!("Must be positive and finite, got {}", scale),
        ));
    }
    if config.speed.table_width == 0 {
        return Err(invalid("speed.table_width", "Must be at least 1".to_string()));
    }
    if config.variation.table_width == 0 {
        return Err(invalid(
            "variation.table_width",
            "Must be at least 1".to_string(),
        ));
    }

    if config.data.missing_markers.is_empty() {
        return Err(invalid(
            "data.missing_markers",
            "At least one marker is required".to_string(),
        ));
    }
    for marker in &config.data.missing_markers {
        if marker.is_empty() || marker.chars().any(char::is_whitespace) {
            return Err(invalid(
                "data.missing_markers",
                format!("Marker {:?} must be a non-empty token without whitespace", marker),
            ));
        }
        if marker.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false) {
            return Err(invalid(
                "data.missing_markers",
                format!("Marker {:?} would shadow a numeric reading", marker),
            ));
        }
    }
    if config.data.variation_missing_value >= 0 {
        return Err(invalid(
            "data.variation_missing_value",
            format!(
                "Must be negative so it never collides with a bin index, got {}",
                config.data.variation_missing_value
            ),
        ));
    }

    Ok(())
}
