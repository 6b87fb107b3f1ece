//! Two-hypothesis Bayes' rule.
//!
//! All functions work on a single probability `prior = P(H)` with the
//! alternative hypothesis carrying `1 - prior`. Degenerate inputs are not
//! rejected: a zero marginal produces NaN, which callers treat as an
//! undefined posterior.

/// Marginal probability of the evidence, `P(e) = P(H)·P(e|H) + P(¬H)·P(e|¬H)`.
#[inline]
pub fn marginal_likelihood(prior: f64, lik_h: f64, lik_alt: f64) -> f64 {
    prior * lik_h + (1.0 - prior) * lik_alt
}

/// One application of Bayes' rule: `P(H|e) = P(e|H)·P(H) / P(e)`.
///
/// Returns NaN when `P(e) = 0` and any NaN input propagates.
#[inline]
pub fn bayes_update(prior: f64, lik_h: f64, lik_alt: f64) -> f64 {
    let evidence = marginal_likelihood(prior, lik_h, lik_alt);
    lik_h * prior / evidence
}

/// Likelihood of several conditionally independent observations under one
/// hypothesis.
#[inline]
pub fn joint_likelihood(likelihoods: &[f64]) -> f64 {
    likelihoods.iter().product()
}

/// Probability of the competing hypothesis.
#[inline]
pub fn complement(p: f64) -> f64 {
    1.0 - p
}

/// True for finite values in [0, 1].
#[inline]
pub fn is_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn update_matches_hand_computation() {
        // 0.8 * 0.5 / (0.5 * 0.8 + 0.5 * 0.2)
        let p = bayes_update(0.5, 0.8, 0.2);
        assert!(approx_eq(p, 0.8, 1e-12));
    }

    #[test]
    fn uninformative_evidence_keeps_prior() {
        let p = bayes_update(0.3, 0.25, 0.25);
        assert!(approx_eq(p, 0.3, 1e-12));
    }

    #[test]
    fn zero_marginal_is_nan() {
        assert!(bayes_update(0.5, 0.0, 0.0).is_nan());
        assert!(bayes_update(0.0, 0.4, 0.0).is_nan());
    }

    #[test]
    fn nan_likelihood_propagates() {
        assert!(bayes_update(0.5, f64::NAN, 0.1).is_nan());
        assert!(bayes_update(f64::NAN, 0.3, 0.1).is_nan());
    }

    #[test]
    fn certain_evidence_saturates() {
        assert!(approx_eq(bayes_update(0.5, 0.4, 0.0), 1.0, 1e-12));
        assert!(approx_eq(bayes_update(0.5, 0.0, 0.4), 0.0, 1e-12));
    }

    #[test]
    fn joint_is_product() {
        assert!(approx_eq(joint_likelihood(&[0.5, 0.2]), 0.1, 1e-12));
        assert!(approx_eq(joint_likelihood(&[]), 1.0, 1e-12));
    }

    #[test]
    fn probability_predicate() {
        assert!(is_probability(0.0));
        assert!(is_probability(1.0));
        assert!(!is_probability(1.0000001));
        assert!(!is_probability(f64::NAN));
        assert!(!is_probability(-0.1));
    }
}
