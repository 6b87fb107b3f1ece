//! Per-observation Bayes factors and their human-readable strength.
//!
//! For one observation `e`, the Bayes factor of H1 against H0 is
//! `P(e|H1) / P(e|H0)`. The classifier reports it in log domain (nats) so a
//! whole track's evidence can be read as a sum of step contributions.

use schemars::JsonSchema;
use serde::Serialize;

/// Log Bayes factor `ln P(e|H1) - ln P(e|H0)` from raw likelihoods.
///
/// A zero likelihood on one side gives ±inf; zero on both sides (or any NaN)
/// gives NaN because the observation carries no comparable evidence.
pub fn log_bf_from_likelihoods(lik_h1: f64, lik_h0: f64) -> f64 {
    if lik_h1.is_nan() || lik_h0.is_nan() || lik_h1 < 0.0 || lik_h0 < 0.0 {
        return f64::NAN;
    }
    match (lik_h1 == 0.0, lik_h0 == 0.0) {
        (true, true) => f64::NAN,
        (true, false) => f64::NEG_INFINITY,
        (false, true) => f64::INFINITY,
        (false, false) => lik_h1.ln() - lik_h0.ln(),
    }
}

/// Convert a log Bayes factor in nats to bits.
pub fn delta_bits(log_bf: f64) -> f64 {
    log_bf / std::f64::consts::LN_2
}

/// Evidence strength on the Jeffreys scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    /// |log_bf| is zero or undefined.
    None,
    /// Below ln(3.2).
    Anecdotal,
    /// ln(3.2) to ln(10).
    Substantial,
    /// ln(10) to ln(32).
    Strong,
    /// ln(32) to ln(100).
    VeryStrong,
    /// ln(100) and beyond, including certain evidence.
    Decisive,
}

impl EvidenceStrength {
    /// Classify from a log Bayes factor; the sign is ignored.
    pub fn from_log_bf(log_bf: f64) -> Self {
        if log_bf.is_nan() {
            return EvidenceStrength::None;
        }
        const LN_3_2: f64 = 1.163_150_809_678_64;
        const LN_32: f64 = 3.465_735_902_799_727;
        const LN_100: f64 = 4.605_170_185_988_092;

        let x = log_bf.abs();
        if x < f64::EPSILON {
            EvidenceStrength::None
        } else if x < LN_3_2 {
            EvidenceStrength::Anecdotal
        } else if x < std::f64::consts::LN_10 {
            EvidenceStrength::Substantial
        } else if x < LN_32 {
            EvidenceStrength::Strong
        } else if x < LN_100 {
            EvidenceStrength::VeryStrong
        } else {
            EvidenceStrength::Decisive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EvidenceStrength::None => "none",
            EvidenceStrength::Anecdotal => "anecdotal",
            EvidenceStrength::Substantial => "substantial",
            EvidenceStrength::Strong => "strong",
            EvidenceStrength::VeryStrong => "very strong",
            EvidenceStrength::Decisive => "decisive",
        }
    }
}

impl std::fmt::Display for EvidenceStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which hypothesis an observation favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceDirection {
    FavorsH1,
    FavorsH0,
    Neutral,
}

impl EvidenceDirection {
    pub fn from_log_bf(log_bf: f64) -> Self {
        if log_bf.is_nan() || log_bf.abs() < f64::EPSILON {
            EvidenceDirection::Neutral
        } else if log_bf > 0.0 {
            EvidenceDirection::FavorsH1
        } else {
            EvidenceDirection::FavorsH0
        }
    }
}

/// Packaged view of one observation's evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvidenceSummary {
    /// Log Bayes factor in nats; NaN when undefined.
    pub log_bf: f64,
    /// Same quantity in bits.
    pub delta_bits: f64,
    pub strength: EvidenceStrength,
    pub direction: EvidenceDirection,
}

impl EvidenceSummary {
    pub fn from_likelihoods(lik_h1: f64, lik_h0: f64) -> Self {
        let log_bf = log_bf_from_likelihoods(lik_h1, lik_h0);
        EvidenceSummary {
            log_bf,
            delta_bits: delta_bits(log_bf),
            strength: EvidenceStrength::from_log_bf(log_bf),
            direction: EvidenceDirection::from_log_bf(log_bf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_bf_of_equal_likelihoods_is_zero() {
        assert_eq!(log_bf_from_likelihoods(0.3, 0.3), 0.0);
    }

    #[test]
    fn log_bf_handles_zero_likelihoods() {
        assert_eq!(log_bf_from_likelihoods(0.0, 0.2), f64::NEG_INFINITY);
        assert_eq!(log_bf_from_likelihoods(0.2, 0.0), f64::INFINITY);
        assert!(log_bf_from_likelihoods(0.0, 0.0).is_nan());
        assert!(log_bf_from_likelihoods(-0.1, 0.2).is_nan());
    }

    #[test]
    fn four_to_one_is_substantial_for_h1() {
        let s = EvidenceSummary::from_likelihoods(0.8, 0.2);
        assert!((s.log_bf - 4.0f64.ln()).abs() < 1e-12);
        assert!((s.delta_bits - 2.0).abs() < 1e-12);
        assert_eq!(s.strength, EvidenceStrength::Substantial);
        assert_eq!(s.direction, EvidenceDirection::FavorsH1);
    }

    #[test]
    fn strength_ignores_sign() {
        assert_eq!(
            EvidenceStrength::from_log_bf(50.0f64.ln()),
            EvidenceStrength::from_log_bf(-(50.0f64.ln()))
        );
        assert_eq!(
            EvidenceStrength::from_log_bf(50.0f64.ln()),
            EvidenceStrength::VeryStrong
        );
    }

    #[test]
    fn infinite_evidence_is_decisive() {
        let s = EvidenceSummary::from_likelihoods(0.0, 0.5);
        assert_eq!(s.strength, EvidenceStrength::Decisive);
        assert_eq!(s.direction, EvidenceDirection::FavorsH0);
    }

    #[test]
    fn undefined_evidence_is_neutral() {
        let s = EvidenceSummary::from_likelihoods(0.0, 0.0);
        assert_eq!(s.strength, EvidenceStrength::None);
        assert_eq!(s.direction, EvidenceDirection::Neutral);
    }

    #[test]
    fn ordering_follows_scale() {
        assert!(EvidenceStrength::Decisive > EvidenceStrength::Strong);
        assert!(EvidenceStrength::Anecdotal > EvidenceStrength::None);
    }
}
