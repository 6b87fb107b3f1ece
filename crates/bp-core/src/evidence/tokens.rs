//! Discretization of raw readings into observation tokens.

use bp_config::VariationTracking;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One raw reading from a speed file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Missing,
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Missing => None,
        }
    }
}

/// A discretized observation, or the explicit absence of one.
///
/// Present indices are signed: a negative speed discretizes to a negative
/// bin, which table lookup reports as out of range rather than clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObservationToken {
    Present(i64),
    Missing,
}

impl ObservationToken {
    pub fn index(self) -> Option<i64> {
        match self {
            ObservationToken::Present(i) => Some(i),
            ObservationToken::Missing => None,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, ObservationToken::Present(_))
    }

    pub fn is_missing(self) -> bool {
        matches!(self, ObservationToken::Missing)
    }
}

/// Speed bin for one reading: `floor(bin_scale * v)`.
///
/// Float-to-int `as` saturates, so huge readings land far out of range
/// instead of wrapping.
pub fn speed_token(reading: Reading, bin_scale: f64) -> ObservationToken {
    match reading {
        Reading::Value(v) => ObservationToken::Present((bin_scale * v).floor() as i64),
        Reading::Missing => ObservationToken::Missing,
    }
}

pub fn speed_tokens(readings: &[Reading], bin_scale: f64) -> Vec<ObservationToken> {
    readings.iter().map(|&r| speed_token(r, bin_scale)).collect()
}

/// Variation tokens: `trunc(|current - previous|)` between consecutive valid
/// readings. The first sample, and any sample lacking a usable previous
/// reading, is `Missing`.
pub fn variation_tokens(
    readings: &[Reading],
    tracking: VariationTracking,
) -> Vec<ObservationToken> {
    match tracking {
        VariationTracking::Strict => variation_tokens_strict(readings),
        VariationTracking::Legacy => variation_tokens_legacy(readings),
    }
}

fn variation_bin(current: f64, previous: f64) -> ObservationToken {
    ObservationToken::Present((current - previous).abs().trunc() as i64)
}

fn variation_tokens_strict(readings: &[Reading]) -> Vec<ObservationToken> {
    let mut previous: Option<f64> = None;
    readings
        .iter()
        .map(|reading| match reading.value() {
            Some(current) => {
                let token = previous
                    .map(|p| variation_bin(current, p))
                    .unwrap_or(ObservationToken::Missing);
                previous = Some(current);
                token
            }
            None => {
                previous = None;
                ObservationToken::Missing
            }
        })
        .collect()
}

// A missing reading stores 0.0, and 0.0 doubles as "no previous value", so a
// genuine 0.0 reading also suppresses the next variation.
fn variation_tokens_legacy(readings: &[Reading]) -> Vec<ObservationToken> {
    let mut last = 0.0_f64;
    readings
        .iter()
        .map(|reading| match reading.value() {
            Some(current) => {
                let token = if last != 0.0 {
                    variation_bin(current, last)
                } else {
                    ObservationToken::Missing
                };
                last = current;
                token
            }
            None => {
                last = 0.0;
                ObservationToken::Missing
            }
        })
        .collect()
}
