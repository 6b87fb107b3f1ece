//! Static checks over a pair of likelihood files.
//!
//! Structural problems (line count, unparsable or out-of-range entries,
//! mismatched class widths) are errors. Softer problems become warnings that
//! `check --strict` promotes to a failure.

use std::path::Path;

use bp_common::{Channel, Class, Result};
use bp_config::ClassifierConfig;
use serde::Serialize;

use crate::data::read_table_pair;
use crate::likelihood::{ChannelTables, LikelihoodModel};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

// Accumulated float error from normalizing counts.
const MASS_TOLERANCE: f64 = 1e-9;

/// Summary of one class's table.
#[derive(Debug, Clone, Serialize)]
pub struct TableCheck {
    pub channel: Channel,
    pub class: Class,
    pub width: usize,
    pub mass: f64,
    pub nonzero_bins: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckWarning {
    MassAboveOne { channel: Channel, class: Class },
    WidthMismatch { channel: Channel, expected: usize, actual: usize },
    AllZero { channel: Channel, class: Class },
}

impl std::fmt::Display for CheckWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckWarning::MassAboveOne { channel, class } => {
                write!(f, "{} {} table sums to more than 1", channel, class)
            }
            CheckWarning::WidthMismatch {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "{} tables have width {}, configuration expects {}",
                channel, actual, expected
            ),
            CheckWarning::AllZero { channel, class } => {
                write!(f, "{} {} table is all zeros", channel, class)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub tables: Vec<TableCheck>,
    pub warnings: Vec<CheckWarning>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn write_text<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        for t in &self.tables {
            writeln!(
                out,
                "{:<9} {:<5} width={} mass={:.6} nonzero={}",
                t.channel, t.class, t.width, t.mass, t.nonzero_bins
            )?;
        }
        for w in &self.warnings {
            writeln!(out, "warning: {}", w)?;
        }
        Ok(())
    }
}

fn expected_width(config: &ClassifierConfig, channel: Channel) -> usize {
    match channel {
        Channel::Speed => config.speed.table_width,
        Channel::Variation => config.variation.table_width,
    }
}

fn inspect(tables: &ChannelTables, config: &ClassifierConfig, report: &mut CheckReport) {
    let channel = tables.channel;
    let expected = expected_width(config, channel);
    if tables.width() != expected {
        report.warnings.push(CheckWarning::WidthMismatch {
            channel,
            expected,
            actual: tables.width(),
        });
    }
    for class in Class::ALL {
        let table = tables.for_class(class);
        let mass = table.mass();
        let nonzero_bins = table.nonzero_bins();
        if mass > 1.0 + MASS_TOLERANCE {
            report
                .warnings
                .push(CheckWarning::MassAboveOne { channel, class });
        }
        if nonzero_bins == 0 {
            report.warnings.push(CheckWarning::AllZero { channel, class });
        }
        report.tables.push(TableCheck {
            channel,
            class,
            width: table.width(),
            mass,
            nonzero_bins,
        });
    }
}

/// Load both likelihood files and report on them.
pub fn check_tables(
    speed_likelihoods: &Path,
    variation_likelihoods: &Path,
    config: &ClassifierConfig,
    ctx: &LogContext,
) -> Result<CheckReport> {
    let model = LikelihoodModel {
        speed: ChannelTables::from_pair(Channel::Speed, read_table_pair(speed_likelihoods)?)?,
        variation: ChannelTables::from_pair(
            Channel::Variation,
            read_table_pair(variation_likelihoods)?,
        )?,
    };
    let mut report = CheckReport {
        tables: Vec::with_capacity(4),
        warnings: Vec::new(),
    };
    inspect(&model.speed, config, &mut report);
    inspect(&model.variation, config, &mut report);

    for warning in &report.warnings {
        log_event!(
            ctx,
            WARN,
            event_names::CHECK_TABLE_WARNING,
            Stage::Load,
            warning.to_string()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(speed: usize, variation: usize) -> ClassifierConfig {
        let mut c = ClassifierConfig::default();
        c.speed.table_width = speed;
        c.variation.table_width = variation;
        c
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn clean_tables_have_no_warnings() {
        let dir = TempDir::new().unwrap();
        let s = write(&dir, "s", "0.5 0.5 0\n0.25 0.25 0.5\n");
        let v = write(&dir, "v", "1 0\n0 1\n");
        let report = check_tables(&s, &v, &config(3, 2), &LogContext::new("t")).unwrap();
        assert!(report.is_clean(), "{:?}", report.warnings);
        assert_eq!(report.tables.len(), 4);
        assert_eq!(report.tables[0].nonzero_bins, 2);
        assert!((report.tables[1].mass - 1.0).abs() < 1e-12);
    }

    #[test]
    fn soft_problems_are_warnings() {
        let dir = TempDir::new().unwrap();
        let s = write(&dir, "s", "0.9 0.9\n0 0\n");
        let v = write(&dir, "v", "1 0\n0 1\n");
        let report = check_tables(&s, &v, &config(2, 100), &LogContext::new("t")).unwrap();
        assert!(report.warnings.contains(&CheckWarning::MassAboveOne {
            channel: Channel::Speed,
            class: Class::Bird
        }));
        assert!(report.warnings.contains(&CheckWarning::AllZero {
            channel: Channel::Speed,
            class: Class::Plane
        }));
        assert!(report.warnings.contains(&CheckWarning::WidthMismatch {
            channel: Channel::Variation,
            expected: 100,
            actual: 2
        }));
    }

    #[test]
    fn structural_problems_are_errors() {
        let dir = TempDir::new().unwrap();
        let s = write(&dir, "s", "0.5 1.5\n0 0\n");
        let v = write(&dir, "v", "1 0\n0 1\n");
        let err = check_tables(&s, &v, &config(2, 2), &LogContext::new("t")).unwrap_err();
        assert!(matches!(err, bp_common::Error::InvalidTable(_)));

        let s = write(&dir, "s2", "0.5 0.5\n");
        let err = check_tables(&s, &v, &config(2, 2), &LogContext::new("t")).unwrap_err();
        assert_eq!(err.category(), bp_common::ErrorCategory::Data);
    }
}
