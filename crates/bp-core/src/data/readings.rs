//! Track files: one object per line, one reading per whitespace-separated token.

use std::path::Path;

use bp_config::DataSettings;

use super::{read_lines, tokens_with_columns, DataError};
use crate::evidence::{ObservationToken, Reading};

/// Parse one line of a speed file.
///
/// Tokens are decimal numbers or one of the configured missing markers.
/// Non-finite numbers (`inf`, lowercase `nan`) are rejected.
pub fn parse_reading_line(
    line: &str,
    path: &Path,
    line_no: usize,
    data: &DataSettings,
) -> Result<Vec<Reading>, DataError> {
    tokens_with_columns(line)
        .map(|(column, tok)| {
            if data.is_missing_marker(tok) {
                return Ok(Reading::Missing);
            }
            match tok.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Reading::Value(v)),
                _ => Err(DataError::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    column,
                    message: format!("expected a number or missing marker, found {:?}", tok),
                }),
            }
        })
        .collect()
}

/// Parse one line of a variation file.
///
/// Tokens are non-negative integers; the configured sentinel (default -1)
/// and the missing markers denote a missing variation.
pub fn parse_variation_line(
    line: &str,
    path: &Path,
    line_no: usize,
    data: &DataSettings,
) -> Result<Vec<ObservationToken>, DataError> {
    tokens_with_columns(line)
        .map(|(column, tok)| {
            if data.is_missing_marker(tok) {
                return Ok(ObservationToken::Missing);
            }
            let err = |message: String| DataError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                column,
                message,
            };
            let value = tok
                .parse::<i64>()
                .map_err(|_| err(format!("expected an integer variation, found {:?}", tok)))?;
            if value == data.variation_missing_value {
                Ok(ObservationToken::Missing)
            } else if value < 0 {
                Err(err(format!("negative variation {}", value)))
            } else {
                Ok(ObservationToken::Present(value))
            }
        })
        .collect()
}

/// Read every track of a speed file.
pub fn read_reading_tracks(
    path: &Path,
    data: &DataSettings,
) -> Result<Vec<Vec<Reading>>, DataError> {
    read_lines(path)?
        .iter()
        .enumerate()
        .map(|(i, line)| parse_reading_line(line, path, i + 1, data))
        .collect()
}

/// Read every track of a variation file.
pub fn read_variation_tracks(
    path: &Path,
    data: &DataSettings,
) -> Result<Vec<Vec<ObservationToken>>, DataError> {
    read_lines(path)?
        .iter()
        .enumerate()
        .map(|(i, line)| parse_variation_line(line, path, i + 1, data))
        .collect()
}
