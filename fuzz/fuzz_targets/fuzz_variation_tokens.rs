//! Fuzz target for variation tokenization over arbitrary reading tracks.

#![no_main]

use arbitrary::Arbitrary;
use bp_config::VariationTracking;
use bp_core::evidence::{speed_tokens, variation_tokens, Reading};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Track {
    readings: Vec<Option<f64>>,
    legacy: bool,
    bin_scale: f64,
}

fuzz_target!(|track: Track| {
    let readings: Vec<Reading> = track
        .readings
        .iter()
        .map(|r| match r {
            Some(v) if v.is_finite() => Reading::Value(*v),
            _ => Reading::Missing,
        })
        .collect();
    let tracking = if track.legacy {
        VariationTracking::Legacy
    } else {
        VariationTracking::Strict
    };
    let variation = variation_tokens(&readings, tracking);
    assert_eq!(variation.len(), readings.len());
    let speed = speed_tokens(&readings, track.bin_scale);
    assert_eq!(speed.len(), readings.len());
});
