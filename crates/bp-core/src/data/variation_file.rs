//! Variation files: one integer per step, the sentinel for missing steps.

use std::path::Path;

use super::table_file::write_all;
use super::DataError;
use crate::evidence::ObservationToken;

/// Render one track as a line of integers.
pub fn format_variation_line(tokens: &[ObservationToken], missing_value: i64) -> String {
    tokens
        .iter()
        .map(|t| t.index().unwrap_or(missing_value).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write one line per track.
pub fn write_variation_tracks(
    path: &Path,
    tracks: &[Vec<ObservationToken>],
    missing_value: i64,
) -> Result<(), DataError> {
    let mut out = String::new();
    for track in tracks {
        out.push_str(&format_variation_line(track, missing_value));
        out.push('\n');
    }
    write_all(path, out.as_bytes())
}
