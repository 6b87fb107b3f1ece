//! Whitespace-delimited text files: speed tracks, variation tracks and
//! two-line likelihood tables.
//!
//! Every file is read completely before any output is produced, so a parse
//! failure never leaves a half-written result behind.

pub mod readings;
pub mod table_file;
pub mod variation_file;

pub use readings::{
    parse_reading_line, parse_variation_line, read_reading_tracks, read_variation_tracks,
};
pub use table_file::{read_table_pair, write_table_pair, TablePair};
pub use variation_file::write_variation_tracks;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing data files.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: line {line}, column {column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{path}: expected {expected} lines, found {found}")]
    LineCount {
        path: PathBuf,
        expected: String,
        found: usize,
    },

    #[error("{path}: line {line}: {message}")]
    Shape {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl From<DataError> for bp_common::Error {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Open { path, source } => bp_common::Error::Open { path, source },
            DataError::Write { source, .. } => bp_common::Error::Io(source),
            DataError::Parse {
                path,
                line,
                column,
                message,
            } => bp_common::Error::Parse {
                path,
                line,
                column,
                message,
            },
            other @ DataError::LineCount { .. } => bp_common::Error::LineCount(other.to_string()),
            other @ DataError::Shape { .. } => bp_common::Error::Shape(other.to_string()),
        }
    }
}

/// Read a file and split it into lines, dropping trailing blank lines.
///
/// Blank lines before the last non-blank line are kept: they are objects
/// with no readings.
pub fn read_lines(path: &Path) -> Result<Vec<String>, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_lines(&content))
}

pub(crate) fn split_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Whitespace-separated tokens with their 1-based character column.
pub(crate) fn tokens_with_columns(line: &str) -> impl Iterator<Item = (usize, &str)> {
    let base = line.as_ptr() as usize;
    line.split_whitespace().map(move |tok| {
        let offset = tok.as_ptr() as usize - base;
        (line[..offset].chars().count() + 1, tok)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_drops_trailing_blanks_only() {
        let lines = split_lines("1 2\n\n3\n\n  \n");
        assert_eq!(lines, vec!["1 2", "", "3"]);
    }

    #[test]
    fn columns_are_one_based_characters() {
        let cols: Vec<_> = tokens_with_columns("  1.5\tNaN  20").collect();
        assert_eq!(cols, vec![(3, "1.5"), (7, "NaN"), (12, "20")]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = read_lines(Path::new("/nonexistent/bp/speeds.txt")).unwrap_err();
        assert!(matches!(err, DataError::Open { .. }));
        let common: bp_common::Error = err.into();
        assert_eq!(common.code(), 12);
    }

    #[test]
    fn parse_error_converts_with_location() {
        let err = DataError::Parse {
            path: PathBuf::from("v.txt"),
            line: 2,
            column: 5,
            message: "bad".into(),
        };
        let common: bp_common::Error = err.into();
        assert!(common.to_string().contains("line 2, column 5"));
    }
}
