//! Sequential Bayesian updating over an object's evidence sequence.
//!
//! Two recurrences run per object:
//! - the bird hypothesis from speed alone
//! - the plane hypothesis from speed and variation fused per step
//!
//! Each step's posterior becomes the next step's prior. Index 0 is never
//! consumed as evidence.

pub mod ledger;
pub mod updater;

pub use ledger::{EvidenceLedger, LedgerEntry, SkipCounts};
pub use updater::{
    EvidenceUsed, PosteriorTrace, SequentialUpdater, SkipReason, StepOutcome, StepRecord,
    UndefinedCause,
};
