//! Batch classification: load tables and tracks, run both recurrences per
//! object, collect verdicts.

use std::path::{Path, PathBuf};

use bp_common::{Channel, ObjectId, Result, RunId};
use bp_config::{ClassifierConfig, ConfigSnapshot, ResolvedConfig};
use chrono::Utc;

use super::report::{BatchReport, ObjectReport, TableFingerprints, TableInfo};
use super::verdict::{decide, PosteriorSource};
use crate::data::{self, read_lines, DataError};
use crate::evidence::{speed_tokens, EvidenceSequence, ObservationToken, Reading};
use crate::inference::{EvidenceLedger, SequentialUpdater};
use crate::likelihood::{ChannelTables, LikelihoodModel};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

/// The four input files of `classify`.
#[derive(Debug, Clone)]
pub struct ClassifyInputs {
    pub speed_data: PathBuf,
    pub speed_likelihoods: PathBuf,
    pub variation_data: PathBuf,
    pub variation_likelihoods: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Objects to classify; 0 means every line of the speed file.
    pub objects: usize,
    /// Build the per-step evidence ledger.
    pub explain: bool,
}

fn load_channel(channel: Channel, path: &Path) -> Result<ChannelTables> {
    let pair = data::read_table_pair(path)?;
    ChannelTables::from_pair(channel, pair).map_err(|e| {
        bp_common::Error::InvalidTable(format!("{}: {}", path.display(), e))
    })
}

/// Load the speed and variation tables.
pub fn load_model(speed_path: &Path, variation_path: &Path) -> Result<LikelihoodModel> {
    Ok(LikelihoodModel {
        speed: load_channel(Channel::Speed, speed_path)?,
        variation: load_channel(Channel::Variation, variation_path)?,
    })
}

/// Classify one object from its raw speed readings and variation tokens.
pub fn classify_track(
    updater: &SequentialUpdater<'_>,
    config: &ClassifierConfig,
    object: ObjectId,
    readings: &[Reading],
    variation: Vec<ObservationToken>,
    explain: bool,
) -> std::result::Result<ObjectReport, crate::evidence::AlignmentError> {
    let speed = speed_tokens(readings, config.speed.bin_scale);
    let bird = updater.bird_posterior(&speed);
    let evidence = EvidenceSequence::aligned(speed, variation)?;
    let plane = updater.plane_posterior(&evidence);

    Ok(ObjectReport {
        object,
        verdict: decide(bird.posterior, plane.posterior),
        bird_only_posterior: bird.posterior,
        fused_posterior: plane.posterior,
        steps: evidence.len(),
        fused_updates: plane.updates(),
        fused_undefined_at: plane.undefined_at(),
        ledger: explain.then(|| EvidenceLedger::from_trace(&plane)),
    })
}

/// Take the first `wanted` lines, or all of them when `wanted` is 0.
fn take_lines(
    path: &Path,
    lines: Vec<String>,
    wanted: usize,
) -> std::result::Result<Vec<String>, DataError> {
    if wanted == 0 {
        return Ok(lines);
    }
    if lines.len() < wanted {
        return Err(DataError::LineCount {
            path: path.to_path_buf(),
            expected: format!("at least {}", wanted),
            found: lines.len(),
        });
    }
    Ok(lines.into_iter().take(wanted).collect())
}

/// Classify a batch of objects and assemble the report.
pub fn classify_batch(
    inputs: &ClassifyInputs,
    options: ClassifyOptions,
    resolved: &ResolvedConfig,
    run_id: &RunId,
    ctx: &LogContext,
) -> Result<BatchReport> {
    let config = &resolved.config;

    // Every input is opened and parsed before any object is classified.
    let model = load_model(&inputs.speed_likelihoods, &inputs.variation_likelihoods)?;
    log_event!(
        ctx,
        INFO,
        event_names::LOAD_TABLES_LOADED,
        Stage::Load,
        "likelihood tables loaded",
        speed_width = model.speed.width(),
        variation_width = model.variation.width()
    );

    // Open failures are reported before any line-count check.
    let speed_lines = read_lines(&inputs.speed_data)?;
    let variation_lines = read_lines(&inputs.variation_data)?;
    let speed_lines = take_lines(&inputs.speed_data, speed_lines, options.objects)?;
    let wanted = speed_lines.len();
    let variation_lines = take_lines(&inputs.variation_data, variation_lines, wanted)?;

    let mut tracks = Vec::with_capacity(wanted);
    for (i, (speed_line, variation_line)) in speed_lines.iter().zip(&variation_lines).enumerate() {
        let line = i + 1;
        let readings =
            data::parse_reading_line(speed_line, &inputs.speed_data, line, &config.data)?;
        let variation =
            data::parse_variation_line(variation_line, &inputs.variation_data, line, &config.data)?;
        tracks.push((readings, variation));
    }
    log_event!(
        ctx,
        INFO,
        event_names::LOAD_DATA_LOADED,
        Stage::Load,
        "tracks loaded",
        objects = tracks.len()
    );

    let updater = SequentialUpdater::new(&model, config.prior.plane)
        .with_out_of_range(config.speed.out_of_range, config.variation.out_of_range);
    let mut objects = Vec::with_capacity(tracks.len());
    for (i, (readings, variation)) in tracks.into_iter().enumerate() {
        let object = ObjectId::from_index(i);
        log_event!(
            ctx,
            DEBUG,
            event_names::PREPROCESS_TRACK_READY,
            Stage::Preprocess,
            "track tokenized",
            object = object.0,
            readings = readings.len(),
            missing = readings.iter().filter(|r| r.value().is_none()).count()
        );
        let report = classify_track(&updater, config, object, &readings, variation, options.explain)
            .map_err(|e| DataError::Shape {
                path: inputs.variation_data.clone(),
                line: i + 1,
                message: e.to_string(),
            })?;

        if let Some(step) = report.fused_undefined_at {
            log_event!(
                ctx,
                INFO,
                event_names::INFER_POSTERIOR_UNDEFINED,
                Stage::Infer,
                "fused posterior undefined",
                object = object.0,
                step = step
            );
        }
        if report.verdict.source == PosteriorSource::SpeedOnlyFallback {
            log_event!(
                ctx,
                DEBUG,
                event_names::INFER_FALLBACK_USED,
                Stage::Infer,
                "speed-only fallback used",
                object = object.0
            );
        }
        log_event!(
            ctx,
            DEBUG,
            event_names::INFER_OBJECT_DONE,
            Stage::Infer,
            "object classified",
            object = object.0,
            plane = report.verdict.plane,
            class = report.verdict.class.as_str()
        );
        objects.push(report);
    }

    Ok(BatchReport {
        schema_version: bp_common::SCHEMA_VERSION.to_string(),
        run_id: run_id.clone(),
        generated_at: Utc::now(),
        config: ConfigSnapshot::new(resolved),
        tables: TableFingerprints {
            speed: TableInfo {
                path: inputs.speed_likelihoods.display().to_string(),
                width: model.speed.width(),
                sha256: model.speed.fingerprint(),
            },
            variation: TableInfo {
                path: inputs.variation_likelihoods.display().to_string(),
                width: model.variation.width(),
                sha256: model.variation.fingerprint(),
            },
        },
        objects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_common::Class;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn inputs(dir: &TempDir, speed: &str, variation: &str) -> ClassifyInputs {
        ClassifyInputs {
            speed_data: write(dir, "speed.txt", speed),
            speed_likelihoods: write(dir, "speed_lik.txt", "0.1 0.1 0.8 0\n0.4 0.4 0.2 0\n"),
            variation_data: write(dir, "var.txt", variation),
            variation_likelihoods: write(dir, "var_lik.txt", "0.7 0.3\n0.2 0.8\n"),
        }
    }

    fn run(inputs: &ClassifyInputs, objects: usize) -> Result<BatchReport> {
        classify_batch(
            inputs,
            ClassifyOptions {
                objects,
                explain: true,
            },
            &ResolvedConfig::builtin(),
            &RunId::new(),
            &LogContext::new("run-test"),
        )
    }

    #[test]
    fn classifies_every_line_when_objects_is_zero() {
        let dir = TempDir::new().unwrap();
        let inp = inputs(&dir, "0 1.0\n0 0.5\n", "-1 1\n-1 1\n");
        let report = run(&inp, 0).unwrap();
        assert_eq!(report.objects.len(), 2);
        assert_eq!(report.objects[0].verdict.class, Class::Bird);
        assert_eq!(report.objects[1].verdict.class, Class::Plane);
        assert!(report.objects[0].ledger.is_some());
    }

    #[test]
    fn too_few_lines_is_data_error() {
        let dir = TempDir::new().unwrap();
        let inp = inputs(&dir, "0 1.0\n", "-1 1\n");
        let err = run(&inp, 10).unwrap_err();
        assert_eq!(err.category(), bp_common::ErrorCategory::Data);
    }

    #[test]
    fn misaligned_tracks_are_shape_error() {
        let dir = TempDir::new().unwrap();
        let inp = inputs(&dir, "0 1.0 1.0\n", "-1 1\n");
        let err = run(&inp, 0).unwrap_err();
        assert!(matches!(err, bp_common::Error::Shape(_)));
    }

    #[test]
    fn missing_table_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let mut inp = inputs(&dir, "0 1.0\n", "-1 1\n");
        inp.variation_likelihoods = dir.path().join("absent.txt");
        assert!(matches!(run(&inp, 0).unwrap_err(), bp_common::Error::Open { .. }));
    }

    #[test]
    fn missing_variation_file_wins_over_short_speed_file() {
        let dir = TempDir::new().unwrap();
        let mut inp = inputs(&dir, "0 1.0\n", "-1 1\n");
        inp.variation_data = dir.path().join("absent.txt");
        // Default batch is 10 objects and the speed file has one line.
        let err = run(&inp, ResolvedConfig::builtin().config.batch.objects).unwrap_err();
        assert!(matches!(err, bp_common::Error::Open { .. }));
    }

    #[test]
    fn short_speed_file_is_line_count_error() {
        let dir = TempDir::new().unwrap();
        let inp = inputs(&dir, "0 1.0\n", "-1 1\n");
        let err = run(&inp, 10).unwrap_err();
        assert!(matches!(err, bp_common::Error::LineCount(_)));
        assert!(err.to_string().contains("expected at least 10 lines, found 1"));
    }

    #[test]
    fn out_of_range_speed_falls_back_to_bird_posterior() {
        let dir = TempDir::new().unwrap();
        // 3.0 discretizes to bin 6, outside the 4-bin speed table, so both
        // recurrences are undefined and the verdict is plane.
        let inp = inputs(&dir, "0 3.0\n", "-1 1\n");
        let report = run(&inp, 0).unwrap();
        let o = &report.objects[0];
        assert_eq!(o.verdict.source, PosteriorSource::SpeedOnlyFallback);
        assert_eq!(o.fused_undefined_at, Some(1));
        assert!(o.verdict.plane.is_nan());
    }

    #[test]
    fn skip_policy_ignores_out_of_range_speed() {
        let dir = TempDir::new().unwrap();
        let inp = inputs(&dir, "0 3.0 1.0\n", "-1 1 1\n");
        let mut resolved = ResolvedConfig::builtin();
        resolved.config.speed.out_of_range = bp_config::OutOfRangePolicy::Skip;
        let report = classify_batch(
            &inp,
            ClassifyOptions::default(),
            &resolved,
            &RunId::new(),
            &LogContext::new("run-test"),
        )
        .unwrap();
        let o = &report.objects[0];
        assert_eq!(o.fused_undefined_at, None);
        assert_eq!(o.fused_updates, 1);
        assert!(!o.verdict.plane.is_nan());
    }
}
