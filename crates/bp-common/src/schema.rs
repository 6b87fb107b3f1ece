//! Schema versioning for report payloads.

/// Version of the JSON report schema emitted by `bp-core`.
///
/// Bumped whenever a field is removed or changes meaning.
pub const SCHEMA_VERSION: &str = "1.0.0";
