//! The two update recurrences and their per-step trace.

use bp_common::{Channel, Class};
use bp_config::OutOfRangePolicy;
use bp_math::{bayes_update, joint_likelihood};
use schemars::JsonSchema;
use serde::Serialize;

use crate::evidence::{EvidenceSequence, ObservationToken};
use crate::likelihood::{ChannelTables, LikelihoodModel, Lookup};

/// Which channels fed an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceUsed {
    Speed,
    SpeedAndVariation,
}

impl EvidenceUsed {
    pub fn channels(self) -> &'static [Channel] {
        match self {
            EvidenceUsed::Speed => &[Channel::Speed],
            EvidenceUsed::SpeedAndVariation => &[Channel::Speed, Channel::Variation],
        }
    }
}

/// Why a step left the posterior unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Speed missing in the speed-only recurrence.
    SpeedMissing,
    /// Both channels missing in the fused recurrence.
    BothMissing,
    /// Only variation present in the fused recurrence.
    VariationOnly,
    /// Speed bin outside its table, ignored under the skip policy.
    OutOfRange,
}

/// Why the posterior became undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UndefinedCause {
    /// A token's bin lies outside the channel's table.
    OutOfRange { channel: Channel, index: i64 },
    /// The marginal likelihood of the evidence was zero.
    ZeroEvidence,
}

/// What happened at one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StepOutcome {
    Updated {
        evidence: EvidenceUsed,
        /// P(e | hypothesis).
        lik_h: f64,
        /// P(e | competing hypothesis).
        lik_alt: f64,
        prior: f64,
        posterior: f64,
    },
    Skipped {
        reason: SkipReason,
    },
    Undefined {
        cause: UndefinedCause,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct StepRecord {
    pub step: usize,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Final posterior plus every step taken to reach it.
///
/// Once a step is undefined the recurrence stops: the posterior stays NaN for
/// the rest of the sequence and no further steps are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PosteriorTrace {
    pub hypothesis: Class,
    pub prior: f64,
    /// NaN when undefined; serialized as null.
    #[schemars(with = "Option<f64>")]
    pub posterior: f64,
    pub steps: Vec<StepRecord>,
}

impl PosteriorTrace {
    fn start(hypothesis: Class, prior: f64) -> Self {
        PosteriorTrace {
            hypothesis,
            prior,
            posterior: prior,
            steps: Vec::new(),
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.posterior.is_nan()
    }

    /// Step at which the posterior became undefined.
    pub fn undefined_at(&self) -> Option<usize> {
        self.steps
            .iter()
            .find(|s| matches!(s.outcome, StepOutcome::Undefined { .. }))
            .map(|s| s.step)
    }

    pub fn updates(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Updated { .. }))
            .count()
    }

    fn skip(&mut self, step: usize, reason: SkipReason) {
        self.steps.push(StepRecord {
            step,
            outcome: StepOutcome::Skipped { reason },
        });
    }

    fn undefined(&mut self, step: usize, cause: UndefinedCause) {
        self.posterior = f64::NAN;
        self.steps.push(StepRecord {
            step,
            outcome: StepOutcome::Undefined { cause },
        });
    }

    /// Apply Bayes' rule with the current posterior as prior.
    fn update(&mut self, step: usize, evidence: EvidenceUsed, lik_h: f64, lik_alt: f64) {
        let prior = self.posterior;
        let posterior = bayes_update(prior, lik_h, lik_alt);
        if posterior.is_nan() {
            self.undefined(step, UndefinedCause::ZeroEvidence);
            return;
        }
        self.posterior = posterior;
        self.steps.push(StepRecord {
            step,
            outcome: StepOutcome::Updated {
                evidence,
                lik_h,
                lik_alt,
                prior,
                posterior,
            },
        });
    }
}

/// Likelihoods of one token under (hypothesis, alternative).
fn lookup_pair(
    tables: &ChannelTables,
    hypothesis: Class,
    token: ObservationToken,
) -> Result<Option<(f64, f64)>, UndefinedCause> {
    let out_of_range = |index| UndefinedCause::OutOfRange {
        channel: tables.channel,
        index,
    };
    match (
        tables.for_class(hypothesis).lookup(token),
        tables.for_class(hypothesis.other()).lookup(token),
    ) {
        (Lookup::Value(h), Lookup::Value(alt)) => Ok(Some((h, alt))),
        (Lookup::OutOfRange(i), _) | (_, Lookup::OutOfRange(i)) => Err(out_of_range(i)),
        _ => Ok(None),
    }
}

/// Runs the recurrences against a shared, read-only model.
#[derive(Debug, Clone, Copy)]
pub struct SequentialUpdater<'a> {
    model: &'a LikelihoodModel,
    prior_plane: f64,
    speed_policy: OutOfRangePolicy,
    variation_policy: OutOfRangePolicy,
}

impl<'a> SequentialUpdater<'a> {
    /// `prior_plane` is P(plane) before any evidence; the bird recurrence
    /// starts from its complement.
    pub fn new(model: &'a LikelihoodModel, prior_plane: f64) -> Self {
        SequentialUpdater {
            model,
            prior_plane,
            speed_policy: OutOfRangePolicy::Undefined,
            variation_policy: OutOfRangePolicy::Undefined,
        }
    }

    /// Set how each channel treats tokens outside its table.
    pub fn with_out_of_range(
        mut self,
        speed: OutOfRangePolicy,
        variation: OutOfRangePolicy,
    ) -> Self {
        self.speed_policy = speed;
        self.variation_policy = variation;
        self
    }

    /// P(bird | speed track).
    pub fn bird_posterior(&self, speed: &[ObservationToken]) -> PosteriorTrace {
        let mut trace = PosteriorTrace::start(Class::Bird, bp_math::complement(self.prior_plane));
        for (step, &token) in speed.iter().enumerate().skip(1) {
            match lookup_pair(&self.model.speed, Class::Bird, token) {
                Ok(Some((lik_bird, lik_plane))) => {
                    trace.update(step, EvidenceUsed::Speed, lik_bird, lik_plane)
                }
                Ok(None) => trace.skip(step, SkipReason::SpeedMissing),
                Err(UndefinedCause::OutOfRange { .. })
                    if self.speed_policy == OutOfRangePolicy::Skip =>
                {
                    trace.skip(step, SkipReason::OutOfRange)
                }
                Err(cause) => trace.undefined(step, cause),
            }
            if !trace.is_defined() {
                break;
            }
        }
        trace
    }

    /// P(plane | speed and variation tracks), fusing both channels per step.
    pub fn plane_posterior(&self, evidence: &EvidenceSequence) -> PosteriorTrace {
        let mut trace = PosteriorTrace::start(Class::Plane, self.prior_plane);
        for step in 1..evidence.len() {
            let Some((speed, variation)) = evidence.step(step) else {
                break;
            };
            match self.fused_step(speed, variation) {
                Ok(FusedStep::Update(used, lik_plane, lik_bird)) => {
                    trace.update(step, used, lik_plane, lik_bird)
                }
                Ok(FusedStep::Skip(reason)) => trace.skip(step, reason),
                Err(cause) => trace.undefined(step, cause),
            }
            if !trace.is_defined() {
                break;
            }
        }
        trace
    }

    fn fused_step(
        &self,
        speed: ObservationToken,
        variation: ObservationToken,
    ) -> Result<FusedStep, UndefinedCause> {
        let speed_pair = match lookup_pair(&self.model.speed, Class::Plane, speed) {
            Err(UndefinedCause::OutOfRange { .. })
                if self.speed_policy == OutOfRangePolicy::Skip =>
            {
                return Ok(FusedStep::Skip(SkipReason::OutOfRange));
            }
            other => other?,
        };
        let Some((speed_plane, speed_bird)) = speed_pair else {
            return Ok(FusedStep::Skip(if variation.is_present() {
                SkipReason::VariationOnly
            } else {
                SkipReason::BothMissing
            }));
        };
        let variation_pair = match lookup_pair(&self.model.variation, Class::Plane, variation) {
            Err(UndefinedCause::OutOfRange { .. })
                if self.variation_policy == OutOfRangePolicy::Skip =>
            {
                None
            }
            other => other?,
        };
        match variation_pair {
            Some((var_plane, var_bird)) => Ok(FusedStep::Update(
                EvidenceUsed::SpeedAndVariation,
                joint_likelihood(&[speed_plane, var_plane]),
                joint_likelihood(&[speed_bird, var_bird]),
            )),
            None => Ok(FusedStep::Update(EvidenceUsed::Speed, speed_plane, speed_bird)),
        }
    }
}

enum FusedStep {
    /// (channels, P(e|plane), P(e|bird))
    Update(EvidenceUsed, f64, f64),
    Skip(SkipReason),
}
