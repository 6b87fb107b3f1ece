//! End-to-end tests driving the bp-core binary over real files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn bp_core(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bp-core").expect("bp-core binary should exist");
    cmd.env_remove("BP_CONFIG")
        .env_remove("BP_LOG")
        .env_remove("BP_LOG_FORMAT")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home);
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Two objects: the first leans bird, the second plane.
fn two_objects(dir: &TempDir) -> [PathBuf; 4] {
    [
        write(dir, "speed.txt", "0 1.0\n0 0.5\n"),
        write(dir, "speed_lik.txt", "0.1 0.1 0.8 0\n0.4 0.4 0.2 0\n"),
        write(dir, "var.txt", "-1 1\n-1 1\n"),
        write(dir, "var_lik.txt", "0.7 0.3\n0.2 0.8\n"),
    ]
}

mod classify {
    use super::*;

    #[test]
    fn text_report_has_three_lines_per_object() {
        let dir = TempDir::new().unwrap();
        let files = two_objects(&dir);
        bp_core(dir.path())
            .arg("classify")
            .args(&files)
            .args(["--objects", "2"])
            .assert()
            .success()
            .stdout(
                "Probability of object 1 being a plane: 0.4\n\
                 Probability of object 1 being a bird: 0.6\n\
                 Conclusion: Object 1 is a bird\n\
                 Probability of object 2 being a plane: 0.914286\n\
                 Probability of object 2 being a bird: 0.0857143\n\
                 Conclusion: Object 2 is a plane\n",
            );
    }

    #[test]
    fn objects_zero_reads_every_line() {
        let dir = TempDir::new().unwrap();
        let files = two_objects(&dir);
        bp_core(dir.path())
            .arg("classify")
            .args(&files)
            .args(["--objects", "0", "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("object 1: bird"))
            .stdout(predicate::str::contains("object 2: plane"))
            .stdout(predicate::str::contains("total: 2 objects, 1 bird, 1 plane"));
    }

    #[test]
    fn batch_size_comes_from_config() {
        let dir = TempDir::new().unwrap();
        let files = two_objects(&dir);
        let config = write(&dir, "config.json", r#"{"batch": {"objects": 1}}"#);
        let assert = bp_core(dir.path())
            .arg("--config")
            .arg(&config)
            .arg("classify")
            .args(&files)
            .assert()
            .success();
        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert_eq!(stdout.lines().count(), 3);
    }

    #[test]
    fn json_report_carries_snapshot_and_fingerprints() {
        let dir = TempDir::new().unwrap();
        let files = two_objects(&dir);
        let assert = bp_core(dir.path())
            .args(["--format", "json", "classify"])
            .args(&files)
            .args(["--objects", "2", "--explain"])
            .assert()
            .success();
        let value: serde_json::Value =
            serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert_eq!(value["schema_version"], "1.0.0");
        assert_eq!(value["config"]["source"], "builtin default");
        assert_eq!(value["tables"]["speed"]["width"], 4);
        assert_eq!(value["tables"]["variation"]["width"], 2);
        let objects = value["objects"].as_array().unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["class"], "bird");
        assert_eq!(objects[1]["class"], "plane");
        assert_eq!(objects[1]["source"], "fused");
        assert!(objects[0]["ledger"]["entries"].as_array().unwrap().len() == 1);
    }

    #[test]
    fn out_of_range_speed_falls_back_and_reports_null() {
        let dir = TempDir::new().unwrap();
        let [_, speed_lik, _, var_lik] = two_objects(&dir);
        let speed = write(&dir, "fast.txt", "0 3.0\n");
        let var = write(&dir, "fast_var.txt", "-1 1\n");
        bp_core(dir.path())
            .arg("classify")
            .args([&speed, &speed_lik, &var, &var_lik])
            .args(["--objects", "1"])
            .assert()
            .success()
            .stdout(
                "Probability of object 1 being a plane: nan\n\
                 Probability of object 1 being a bird: nan\n\
                 Conclusion: Object 1 is a plane\n",
            );

        let assert = bp_core(dir.path())
            .args(["--format", "jsonl", "classify"])
            .args([&speed, &speed_lik, &var, &var_lik])
            .args(["--objects", "1"])
            .assert()
            .success();
        let line: serde_json::Value =
            serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert!(line["plane"].is_null());
        assert_eq!(line["source"], "speed_only_fallback");
    }

    #[test]
    fn jsonl_logs_go_to_stderr_only() {
        let dir = TempDir::new().unwrap();
        let files = two_objects(&dir);
        let assert = bp_core(dir.path())
            .args(["-vv", "--log-format", "jsonl", "classify"])
            .args(&files)
            .args(["--objects", "2"])
            .assert()
            .success();
        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert!(stdout.starts_with("Probability of object 1"));
        let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
        let events: Vec<serde_json::Value> = stderr
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        assert!(events.iter().any(|e| e["event"] == "infer.object_done"));
        assert!(events.iter().all(|e| e["run_id"] == events[0]["run_id"]));
    }
}

mod gen_var {
    use super::*;

    const TRAINING: &str = "10 10.5 10.2 11.3 11.9 13.0\n20 20.5 21.7 26.9\n";

    #[test]
    fn writes_hand_computed_tables() {
        let dir = TempDir::new().unwrap();
        let training = write(&dir, "train.txt", TRAINING);
        let test = write(&dir, "test.txt", "0 0.2 1.4\n");
        let var_out = dir.path().join("var.txt");
        let lik_out = dir.path().join("var_lik.txt");
        bp_core(dir.path())
            .arg("gen-var")
            .args([&training, &test, &var_out, &lik_out])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let lik = fs::read_to_string(&lik_out).unwrap();
        let lines: Vec<&str> = lik.lines().collect();
        assert_eq!(lines.len(), 2);
        let bird: Vec<f64> = lines[0].split_whitespace().map(|t| t.parse().unwrap()).collect();
        let plane: Vec<f64> = lines[1].split_whitespace().map(|t| t.parse().unwrap()).collect();
        assert_eq!(bird.len(), 100);
        assert_eq!(plane.len(), 100);
        assert_eq!(&bird[..3], &[0.6, 0.4, 0.0]);
        for i in [0, 1, 5] {
            assert!((plane[i] - 1.0 / 3.0).abs() < 1e-15);
        }
        assert_eq!(fs::read_to_string(&var_out).unwrap(), "-1 0 1\n");
    }

    #[test]
    fn outputs_feed_the_classifier() {
        let dir = TempDir::new().unwrap();
        let training = write(&dir, "train.txt", TRAINING);
        let test = write(&dir, "test.txt", "0 0.2 1.4\n");
        let var_out = dir.path().join("var.txt");
        let lik_out = dir.path().join("var_lik.txt");
        bp_core(dir.path())
            .arg("gen-var")
            .args([&training, &test, &var_out, &lik_out])
            .assert()
            .success();

        // Uninformative speed table: only variation moves the fused posterior.
        // P = 5/14 after step 1, 25/79 after step 2.
        let speed_lik = write(&dir, "speed_lik.txt", "0.25 0.25 0.25 0.25\n0.25 0.25 0.25 0.25\n");
        bp_core(dir.path())
            .arg("classify")
            .args([&test, &speed_lik, &var_out, &lik_out])
            .args(["--objects", "1"])
            .assert()
            .success()
            .stdout(
                "Probability of object 1 being a plane: 0.316456\n\
                 Probability of object 1 being a bird: 0.683544\n\
                 Conclusion: Object 1 is a bird\n",
            );
    }
}

mod tools {
    use super::*;

    #[test]
    fn train_speed_then_check() {
        let dir = TempDir::new().unwrap();
        let training = write(&dir, "train.txt", "0 1.0 1.2\n0 3.0 NaN\n");
        let out = dir.path().join("speed_lik.txt");
        bp_core(dir.path())
            .args(["train-speed", "--width", "8"])
            .args([&training, &out])
            .assert()
            .success();
        let var_lik = write(&dir, "var_lik.txt", "1 0\n0 1\n");
        bp_core(dir.path())
            .arg("check")
            .args([&out, &var_lik])
            .assert()
            .success()
            .stdout(predicate::str::contains("width=8"))
            .stdout(predicate::str::contains("warning: speed tables have width 8"));
        bp_core(dir.path())
            .args(["check", "--strict"])
            .args([&out, &var_lik])
            .assert()
            .code(11);
    }

    #[test]
    fn config_show_prints_defaults() {
        let dir = TempDir::new().unwrap();
        let assert = bp_core(dir.path())
            .args(["--format", "json", "config", "show"])
            .assert()
            .success();
        let value: serde_json::Value =
            serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert_eq!(value["config"]["prior"]["plane"], 0.5);
        assert_eq!(value["config"]["variation"]["tracking"], "strict");
        assert_eq!(value["snapshot"]["source"], "builtin default");
    }

    #[test]
    fn xdg_config_is_picked_up() {
        let dir = TempDir::new().unwrap();
        let app_dir = dir.path().join("bird_plane");
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("config.json"), r#"{"variation": {"tracking": "legacy"}}"#).unwrap();
        bp_core(dir.path())
            .args(["--format", "json", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"legacy\""));
    }

    #[test]
    fn schema_describes_report() {
        let dir = TempDir::new().unwrap();
        bp_core(dir.path())
            .arg("schema")
            .assert()
            .success()
            .stdout(predicate::str::contains("BatchReport"))
            .stdout(predicate::str::contains("fused_posterior"));
    }

    #[test]
    fn completions_are_generated() {
        let dir = TempDir::new().unwrap();
        bp_core(dir.path())
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bp-core"));
    }
}
