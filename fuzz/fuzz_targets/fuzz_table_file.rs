//! Fuzz target for likelihood table files.
//!
//! Parsed tables must either build a valid channel or fail with an error.

#![no_main]

use bp_common::Channel;
use bp_core::data::table_file::parse_table_pair;
use bp_core::likelihood::ChannelTables;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &str| {
    if let Ok(pair) = parse_table_pair(data, Path::new("fuzz_lik.txt")) {
        if let Ok(tables) = ChannelTables::from_pair(Channel::Speed, pair) {
            assert_eq!(tables.bird.width(), tables.plane.width());
        }
    }
});
