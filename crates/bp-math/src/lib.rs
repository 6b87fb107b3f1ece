//! Bird/plane classifier math utilities.

pub mod math;

pub use math::bayes::*;
pub use math::bayes_factor;
pub use math::bayes_factor::{
    delta_bits, log_bf_from_likelihoods, EvidenceDirection, EvidenceStrength, EvidenceSummary,
};
