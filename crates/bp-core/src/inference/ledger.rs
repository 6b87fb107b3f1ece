//! Evidence ledger: a per-step account of how the fused posterior moved.

use bp_common::Channel;
use bp_math::{EvidenceDirection, EvidenceStrength, EvidenceSummary};
use schemars::JsonSchema;
use serde::Serialize;

use super::updater::{PosteriorTrace, SkipReason, StepOutcome};

/// One update of the fused posterior.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LedgerEntry {
    pub step: usize,
    pub channels: Vec<Channel>,
    pub lik_plane: f64,
    pub lik_bird: f64,
    pub prior: f64,
    pub posterior: f64,
    /// ln P(e|plane) - ln P(e|bird); null when undefined or infinite.
    #[schemars(with = "Option<f64>")]
    pub log_bf: f64,
    #[schemars(with = "Option<f64>")]
    pub delta_bits: f64,
    pub strength: EvidenceStrength,
    pub direction: EvidenceDirection,
}

/// Skipped steps by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SkipCounts {
    pub both_missing: usize,
    pub variation_only: usize,
    pub out_of_range: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct EvidenceLedger {
    pub entries: Vec<LedgerEntry>,
    pub skipped: SkipCounts,
    /// Step at which the posterior became undefined, if it did.
    pub undefined_at: Option<usize>,
    /// Sum of finite per-step log Bayes factors.
    pub total_log_bf: f64,
}

impl EvidenceLedger {
    /// Build from the fused plane trace.
    pub fn from_trace(trace: &PosteriorTrace) -> Self {
        let mut entries = Vec::new();
        let mut skipped = SkipCounts::default();

        for record in &trace.steps {
            match record.outcome {
                StepOutcome::Updated {
                    evidence,
                    lik_h,
                    lik_alt,
                    prior,
                    posterior,
                } => {
                    let summary = EvidenceSummary::from_likelihoods(lik_h, lik_alt);
                    entries.push(LedgerEntry {
                        step: record.step,
                        channels: evidence.channels().to_vec(),
                        lik_plane: lik_h,
                        lik_bird: lik_alt,
                        prior,
                        posterior,
                        log_bf: summary.log_bf,
                        delta_bits: summary.delta_bits,
                        strength: summary.strength,
                        direction: summary.direction,
                    });
                }
                StepOutcome::Skipped { reason } => match reason {
                    SkipReason::BothMissing | SkipReason::SpeedMissing => skipped.both_missing += 1,
                    SkipReason::VariationOnly => skipped.variation_only += 1,
                    SkipReason::OutOfRange => skipped.out_of_range += 1,
                },
                StepOutcome::Undefined { .. } => {}
            }
        }

        let total_log_bf = entries
            .iter()
            .map(|e| e.log_bf)
            .filter(|v| v.is_finite())
            .sum();

        EvidenceLedger {
            entries,
            skipped,
            undefined_at: trace.undefined_at(),
            total_log_bf,
        }
    }

    /// The `n` entries with the largest |log_bf|, strongest first.
    pub fn strongest(&self, n: usize) -> Vec<&LedgerEntry> {
        let mut ranked: Vec<&LedgerEntry> = self
            .entries
            .iter()
            .filter(|e| !e.log_bf.is_nan())
            .collect();
        ranked.sort_by(|a, b| b.log_bf.abs().total_cmp(&a.log_bf.abs()));
        ranked.truncate(n);
        ranked
    }
}
