//! Error types for the bird/plane classifier.
//!
//! Every fatal condition the tools can hit falls into one of four categories:
//! - configuration (arguments, config files, unopenable inputs)
//! - data (malformed tokens, mismatched shapes, bad likelihood tables)
//! - inference (internal invariant violations; numeric degeneracy is *not* an error)
//! - I/O and serialization
//!
//! Errors can be formatted for humans with a headline and a fix:
//! ```text
//! ✗ Data Error
//!   Reason: speed data line 3, column 7: unparseable token "1.2.3"
//!   Fix: check the input file for stray characters
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for classifier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// CLI arguments and configuration files.
    Config,
    /// Input data and likelihood tables.
    Data,
    /// Inference engine invariants.
    Inference,
    /// File I/O and serialization.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the classifier tools.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    Usage(String),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Data errors (20-29)
    #[error("{path}: line {line}, column {column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("invalid likelihood table: {0}")]
    InvalidTable(String),

    #[error("line count: {0}")]
    LineCount(String),

    // Inference errors (30-39)
    #[error("inference failed: {0}")]
    Inference(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Data errors
    /// - 30-39: Inference errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::Usage(_) => 11,
            Error::Open { .. } => 12,
            Error::Parse { .. } => 20,
            Error::Shape(_) => 21,
            Error::InvalidTable(_) => 22,
            Error::LineCount(_) => 23,
            Error::Inference(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::Usage(_) | Error::Open { .. } => ErrorCategory::Config,
            Error::Parse { .. }
            | Error::Shape(_)
            | Error::InvalidTable(_)
            | Error::LineCount(_) => ErrorCategory::Data,
            Error::Inference(_) => ErrorCategory::Inference,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "run 'bp-core config validate' to inspect the configuration",
            Error::Usage(_) => "run 'bp-core --help' for the expected arguments",
            Error::Open { .. } => "check that the file exists and is readable",
            Error::Parse { .. } => "check the input file for stray characters or wrong markers",
            Error::Shape(_) => "speed and variation files must describe the same objects and steps",
            Error::InvalidTable(_) => "run 'bp-core check' on the likelihood files",
            Error::LineCount(_) => {
                "supply one line per object (or lower --objects); likelihood files hold two lines"
            }
            Error::Inference(_) => "this is a bug; please report it with the inputs",
            Error::Io(_) => "check disk space and permissions",
            Error::Json(_) => "this is a bug; please report it",
        }
    }

    /// Format for human consumption.
    pub fn human(&self) -> String {
        let headline = match self.category() {
            ErrorCategory::Config => "Configuration Error",
            ErrorCategory::Data => "Data Error",
            ErrorCategory::Inference => "Inference Error",
            ErrorCategory::Io => "I/O Error",
        };
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            headline,
            self,
            self.remediation()
        )
    }

    /// Structured form for JSON error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "category": self.category(),
            "message": self.to_string(),
            "remediation": self.remediation(),
        })
    }
}
