//! Observation tokens and per-object evidence sequences.
//!
//! Raw readings become discretized tokens here. Speed and variation
//! channels are tokenized independently and kept index-aligned so step `i`
//! of one channel always describes the same instant as step `i` of the other.

pub mod tokens;

pub use tokens::{speed_token, speed_tokens, variation_tokens, ObservationToken, Reading};

use serde::Serialize;

/// One object's aligned speed and variation tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceSequence {
    speed: Vec<ObservationToken>,
    variation: Vec<ObservationToken>,
}

/// Speed and variation channels disagree on the number of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("speed track has {speed} steps but variation track has {variation}")]
pub struct AlignmentError {
    pub speed: usize,
    pub variation: usize,
}

impl EvidenceSequence {
    /// Pair two channels, rejecting tracks of different length.
    pub fn aligned(
        speed: Vec<ObservationToken>,
        variation: Vec<ObservationToken>,
    ) -> Result<Self, AlignmentError> {
        if speed.len() != variation.len() {
            return Err(AlignmentError {
                speed: speed.len(),
                variation: variation.len(),
            });
        }
        Ok(EvidenceSequence { speed, variation })
    }

    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    pub fn speed(&self) -> &[ObservationToken] {
        &self.speed
    }

    pub fn variation(&self) -> &[ObservationToken] {
        &self.variation
    }

    /// Tokens at step `i` as (speed, variation).
    pub fn step(&self, i: usize) -> Option<(ObservationToken, ObservationToken)> {
        Some((*self.speed.get(i)?, *self.variation.get(i)?))
    }

    /// Number of steps where both channels are present.
    pub fn complete_steps(&self) -> usize {
        self.speed
            .iter()
            .zip(&self.variation)
            .filter(|(s, v)| s.is_present() && v.is_present())
            .count()
    }
}
