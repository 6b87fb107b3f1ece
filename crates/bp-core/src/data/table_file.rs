//! Likelihood files: line 1 holds the bird table, line 2 the plane table.

use std::io::Write;
use std::path::Path;

use super::{split_lines, tokens_with_columns, DataError};

/// Raw entries of a likelihood file, before range validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePair {
    pub bird: Vec<f64>,
    pub plane: Vec<f64>,
}

/// Parse the two-line table format.
pub fn parse_table_pair(content: &str, path: &Path) -> Result<TablePair, DataError> {
    let lines = split_lines(content);
    if lines.len() != 2 || lines.iter().any(|l| l.trim().is_empty()) {
        return Err(DataError::LineCount {
            path: path.to_path_buf(),
            expected: "exactly 2 non-empty".to_string(),
            found: lines.iter().filter(|l| !l.trim().is_empty()).count(),
        });
    }

    let parse_line = |line: &str, line_no: usize| -> Result<Vec<f64>, DataError> {
        tokens_with_columns(line)
            .map(|(column, tok)| match tok.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(DataError::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    column,
                    message: format!("expected a probability, found {:?}", tok),
                }),
            })
            .collect()
    };

    Ok(TablePair {
        bird: parse_line(&lines[0], 1)?,
        plane: parse_line(&lines[1], 2)?,
    })
}

/// Read and parse a likelihood file.
pub fn read_table_pair(path: &Path) -> Result<TablePair, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table_pair(&content, path)
}

/// One table as a space-separated line. `{}` prints the shortest string that
/// parses back to the same f64, so written tables reload exactly.
pub fn format_table_line(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a likelihood file, bird line first.
pub fn write_table_pair(path: &Path, bird: &[f64], plane: &[f64]) -> Result<(), DataError> {
    let content = format!("{}\n{}\n", format_table_line(bird), format_table_line(plane));
    write_all(path, content.as_bytes())
}

pub(crate) fn write_all(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    let to_err = |source| DataError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(to_err)?;
    file.write_all(bytes).map_err(to_err)?;
    file.flush().map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn parses_bird_then_plane() {
        let pair = parse_table_pair("0.6 0.4 0 \n0 0.5 0.5 \n", &PathBuf::from("t")).unwrap();
        assert_eq!(pair.bird, vec![0.6, 0.4, 0.0]);
        assert_eq!(pair.plane, vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn tolerates_missing_final_newline() {
        let pair = parse_table_pair("1\n0", &PathBuf::from("t")).unwrap();
        assert_eq!(pair.plane, vec![0.0]);
    }

    #[test]
    fn rejects_wrong_line_count() {
        let err = parse_table_pair("0.1 0.2\n", &PathBuf::from("t")).unwrap_err();
        assert!(matches!(err, DataError::LineCount { found: 1, .. }));
        let err = parse_table_pair("0.1\n0.2\n0.3\n", &PathBuf::from("t")).unwrap_err();
        assert!(matches!(err, DataError::LineCount { found: 3, .. }));
        let err = parse_table_pair("0.1\n\n0.3\n", &PathBuf::from("t")).unwrap_err();
        assert!(matches!(err, DataError::LineCount { .. }));
    }

    #[test]
    fn rejects_non_numeric_entry() {
        let err = parse_table_pair("0.1 x\n0.2 0.3\n", &PathBuf::from("t")).unwrap_err();
        assert!(matches!(
            err,
            DataError::Parse {
                line: 1,
                column: 5,
                ..
            }
        ));
    }

    #[test]
    fn written_tables_reload_exactly() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lik.txt");
        let bird = vec![1.0 / 3.0, 0.0, 2.0 / 3.0];
        let plane = vec![0.1, 0.7, 0.2];
        write_table_pair(&path, &bird, &plane).unwrap();
        let pair = read_table_pair(&path).unwrap();
        assert_eq!(pair.bird, bird);
        assert_eq!(pair.plane, plane);
    }

    #[test]
    fn format_uses_shortest_round_trip() {
        assert_eq!(format_table_line(&[0.6, 0.0, 1.0]), "0.6 0 1");
    }
}
