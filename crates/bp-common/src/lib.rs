//! Bird/plane classifier common types, IDs, and errors.
//!
//! This crate provides foundational types shared across bp-core modules:
//! - The two hypothesis classes and the evidence channels
//! - Object identity within a batch
//! - Common error types
//! - Output formats

pub mod categories;
pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use categories::{Channel, Class};
pub use error::{Error, ErrorCategory, Result};
pub use id::{ObjectId, RunId};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
