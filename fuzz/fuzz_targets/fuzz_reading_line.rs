//! Fuzz target for speed track line parsing.
//!
//! Tests that `parse_reading_line` handles arbitrary input without panicking
//! and that every parsed value is finite.

#![no_main]

use bp_config::DataSettings;
use bp_core::data::parse_reading_line;
use bp_core::evidence::Reading;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &str| {
    let settings = DataSettings::default();
    if let Ok(readings) = parse_reading_line(data, Path::new("fuzz.txt"), 1, &settings) {
        for r in readings {
            if let Reading::Value(v) = r {
                assert!(v.is_finite());
            }
        }
    }
});
