//! Report payloads and their rendering in each output format.

use std::io::{self, Write};

use bp_common::{Class, ObjectId, OutputFormat, RunId};
use bp_config::ConfigSnapshot;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use super::format::format_g;
use super::verdict::Verdict;
use crate::inference::EvidenceLedger;

/// Number of ledger entries shown per object in text output.
const TEXT_LEDGER_ENTRIES: usize = 3;

/// Result for one object.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ObjectReport {
    pub object: ObjectId,
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Speed-only P(bird); null when undefined.
    #[schemars(with = "Option<f64>")]
    pub bird_only_posterior: f64,
    /// Fused P(plane); null when undefined.
    #[schemars(with = "Option<f64>")]
    pub fused_posterior: f64,
    /// Number of readings in the track.
    pub steps: usize,
    /// Steps that updated the fused posterior.
    pub fused_updates: usize,
    /// Step at which the fused posterior became undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fused_undefined_at: Option<usize>,
    /// Per-step evidence, present with `--explain`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<EvidenceLedger>,
}

/// Where a channel's tables came from and what they contained.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableInfo {
    pub path: String,
    pub width: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableFingerprints {
    pub speed: TableInfo,
    pub variation: TableInfo,
}

/// The full JSON document emitted by `classify --format json`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchReport {
    pub schema_version: String,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub config: ConfigSnapshot,
    pub tables: TableFingerprints,
    pub objects: Vec<ObjectReport>,
}

impl BatchReport {
    pub fn count(&self, class: Class) -> usize {
        self.objects
            .iter()
            .filter(|o| o.verdict.class == class)
            .count()
    }

    pub fn fallbacks(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.verdict.source == super::verdict::PosteriorSource::SpeedOnlyFallback)
            .count()
    }

    /// Write the report in `format`. `explain` adds the strongest evidence
    /// steps to text output; JSON formats carry whatever ledgers were built.
    pub fn render<W: Write>(
        &self,
        format: OutputFormat,
        explain: bool,
        out: &mut W,
    ) -> io::Result<()> {
        match format {
            OutputFormat::Text => {
                for object in &self.objects {
                    write_text(object, out)?;
                    if explain {
                        write_explanation(object, out)?;
                    }
                }
            }
            OutputFormat::Summary => {
                for object in &self.objects {
                    writeln!(out, "{}", summary_line(object))?;
                }
                writeln!(
                    out,
                    "total: {} objects, {} bird, {} plane, {} speed-only",
                    self.objects.len(),
                    self.count(Class::Bird),
                    self.count(Class::Plane),
                    self.fallbacks()
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
            OutputFormat::Jsonl => {
                for object in &self.objects {
                    serde_json::to_writer(&mut *out, object)?;
                    writeln!(out)?;
                }
            }
        }
        out.flush()
    }
}

/// The three-line report for one object.
pub fn write_text<W: Write>(object: &ObjectReport, out: &mut W) -> io::Result<()> {
    let n = object.object;
    writeln!(
        out,
        "Probability of object {} being a plane: {}",
        n,
        format_g(object.verdict.plane)
    )?;
    writeln!(
        out,
        "Probability of object {} being a bird: {}",
        n,
        format_g(object.verdict.bird)
    )?;
    writeln!(out, "Conclusion: Object {} is a {}", n, object.verdict.class)
}

fn write_explanation<W: Write>(object: &ObjectReport, out: &mut W) -> io::Result<()> {
    let Some(ledger) = &object.ledger else {
        return Ok(());
    };
    if let Some(step) = ledger.undefined_at {
        writeln!(out, "  fused posterior undefined at step {}; speed-only fallback", step)?;
    }
    for entry in ledger.strongest(TEXT_LEDGER_ENTRIES) {
        let channels = entry
            .channels
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let favors = if entry.log_bf > 0.0 {
            "plane"
        } else if entry.log_bf < 0.0 {
            "bird"
        } else {
            "neither"
        };
        writeln!(
            out,
            "  step {} ({}): log BF {} ({}, favors {})",
            entry.step,
            channels,
            format_g(entry.log_bf),
            entry.strength,
            favors
        )?;
    }
    write!(
        out,
        "  skipped: {} missing, {} variation-only",
        ledger.skipped.both_missing, ledger.skipped.variation_only
    )?;
    if ledger.skipped.out_of_range > 0 {
        write!(out, ", {} out-of-range", ledger.skipped.out_of_range)?;
    }
    writeln!(out)
}

pub fn summary_line(object: &ObjectReport) -> String {
    let source = match object.verdict.source {
        super::verdict::PosteriorSource::Fused => "fused",
        super::verdict::PosteriorSource::SpeedOnlyFallback => "speed-only",
    };
    format!(
        "object {}: {} (plane={} bird={}, {})",
        object.object,
        object.verdict.class,
        format_g(object.verdict.plane),
        format_g(object.verdict.bird),
        source
    )
}
