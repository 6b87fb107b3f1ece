//! Round-trip the documented config file through the loader.

use bp_config::{
    resolve::load_from, validate_config, ClassifierConfig, ConfigSource, VariationTracking,
};
use std::fs;
use tempfile::TempDir;

const DOCUMENTED: &str = r#"{
  "schema_version": "1.0.0",
  "prior": { "plane": 0.5 },
  "speed": { "bin_scale": 2.0, "table_width": 400, "out_of_range": "undefined" },
  "variation": { "table_width": 100, "tracking": "strict", "out_of_range": "undefined" },
  "data": { "missing_markers": ["NaN"], "variation_missing_value": -1 },
  "batch": { "objects": 10 }
}"#;

#[test]
fn documented_config_equals_defaults() {
    let parsed = ClassifierConfig::from_json(DOCUMENTED).unwrap();
    assert_eq!(parsed, ClassifierConfig::default());
    assert!(validate_config(&parsed).is_ok());
}

#[test]
fn serialized_defaults_parse_back() {
    let json = serde_json::to_string_pretty(&ClassifierConfig::default()).unwrap();
    let parsed = ClassifierConfig::from_json(&json).unwrap();
    assert_eq!(parsed, ClassifierConfig::default());
}

#[test]
fn legacy_config_file_loads() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(
        &path,
        r#"{"variation": {"tracking": "legacy"}, "data": {"missing_markers": ["NaN", "-"]}}"#,
    )
    .unwrap();
    let resolved = load_from(&path, ConfigSource::Environment).unwrap();
    assert_eq!(resolved.config.variation.tracking, VariationTracking::Legacy);
    assert!(resolved.config.data.is_missing_marker("-"));
    assert_eq!(resolved.source, ConfigSource::Environment);
}

#[test]
fn unknown_tracking_value_fails_to_parse() {
    let err = ClassifierConfig::from_json(r#"{"variation": {"tracking": "fuzzy"}}"#).unwrap_err();
    assert_eq!(err.code(), 61);
}
