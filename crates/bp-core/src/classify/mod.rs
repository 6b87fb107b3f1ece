//! Verdicts, reports and the batch runner for the `classify` command.

pub mod format;
pub mod report;
pub mod runner;
pub mod verdict;

pub use format::format_g;
pub use report::{BatchReport, ObjectReport, TableFingerprints};
pub use runner::{classify_batch, classify_track, load_model, ClassifyInputs, ClassifyOptions};
pub use verdict::{decide, PosteriorSource, Verdict};
