//! Fuzz target for variation track line parsing.

#![no_main]

use bp_config::DataSettings;
use bp_core::data::parse_variation_line;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &str| {
    let settings = DataSettings::default();
    if let Ok(tokens) = parse_variation_line(data, Path::new("fuzz.txt"), 1, &settings) {
        // Present tokens are never negative; the sentinel maps to Missing.
        assert!(tokens.iter().all(|t| t.index().map_or(true, |i| i >= 0)));
    }
});
