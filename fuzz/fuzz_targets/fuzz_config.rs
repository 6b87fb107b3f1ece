//! Fuzz target for classifier config parsing and validation.
//!
//! Tests that config JSON parsing handles arbitrary input without panicking.

#![no_main]

use bp_config::{validate_config, ClassifierConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<ClassifierConfig>(data) {
        let _ = validate_config(&config);
    }
});
