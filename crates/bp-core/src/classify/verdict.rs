//! Turning the two posteriors into a verdict.

use bp_common::Class;
use schemars::JsonSchema;
use serde::Serialize;

/// Which posterior the reported probabilities come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PosteriorSource {
    /// The fused speed + variation plane posterior.
    Fused,
    /// The fused posterior was undefined; the speed-only bird posterior is used.
    SpeedOnlyFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct Verdict {
    /// P(plane); null when undefined.
    #[schemars(with = "Option<f64>")]
    pub plane: f64,
    /// P(bird); null when undefined.
    #[schemars(with = "Option<f64>")]
    pub bird: f64,
    pub class: Class,
    pub source: PosteriorSource,
}

impl Verdict {
    /// Whether the reported probabilities are defined.
    pub fn is_defined(&self) -> bool {
        !self.plane.is_nan() && !self.bird.is_nan()
    }
}

/// Combine the speed-only bird posterior `bird_only` with the fused plane
/// posterior `fused`.
///
/// Ties go to bird: `bird_only >= 0.5` or `fused <= 0.5`. If both posteriors
/// are undefined the comparison fails and the verdict is plane.
pub fn decide(bird_only: f64, fused: f64) -> Verdict {
    if fused.is_nan() {
        Verdict {
            plane: bp_math::complement(bird_only),
            bird: bird_only,
            class: if bird_only >= 0.5 { Class::Bird } else { Class::Plane },
            source: PosteriorSource::SpeedOnlyFallback,
        }
    } else {
        Verdict {
            plane: fused,
            bird: bp_math::complement(fused),
            class: if fused <= 0.5 { Class::Bird } else { Class::Plane },
            source: PosteriorSource::Fused,
        }
    }
}
