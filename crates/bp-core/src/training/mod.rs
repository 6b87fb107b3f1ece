//! Building likelihood tables and derived variation data from labeled tracks.
//!
//! Training files hold one track per line: the first half are birds, the
//! second half planes.

use std::path::{Path, PathBuf};

use bp_common::{Channel, Class, Result};
use bp_config::ClassifierConfig;
use serde::Serialize;

use crate::data::{read_reading_tracks, write_table_pair, write_variation_tracks};
use crate::evidence::{speed_tokens, variation_tokens, ObservationToken};
use crate::likelihood::{BuildError, BuiltTables, TableBuilder};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

/// Outcome of building one channel's tables.
#[derive(Debug, Clone, Serialize)]
pub struct TrainSummary {
    pub channel: Channel,
    pub output: PathBuf,
    pub width: usize,
    pub tracks: usize,
    pub bird_observations: u64,
    pub plane_observations: u64,
    pub empty_classes: Vec<Class>,
}

/// Outcome of `gen-var`.
#[derive(Debug, Clone, Serialize)]
pub struct GenVarSummary {
    pub likelihoods: TrainSummary,
    pub variation_data: PathBuf,
    pub test_tracks: usize,
}

fn build_error(path: &Path, err: BuildError) -> bp_common::Error {
    match err {
        BuildError::BinOutOfRange {
            track,
            step,
            value,
            width,
        } => bp_common::Error::Parse {
            path: path.to_path_buf(),
            line: track,
            column: step + 1,
            message: format!("bin {} at step {} is outside table width {}", value, step, width),
        },
        BuildError::TrackCount(n) => bp_common::Error::Shape(format!(
            "{}: training data must hold a non-zero, even number of tracks, found {}",
            path.display(),
            n
        )),
        BuildError::Table(e) => e.into(),
    }
}

fn summarize(
    built: &BuiltTables,
    output: &Path,
    tracks: usize,
    ctx: &LogContext,
) -> TrainSummary {
    let channel = built.tables.channel;
    for class in built.empty_classes() {
        log_event!(
            ctx,
            WARN,
            event_names::TRAIN_EMPTY_CLASS,
            Stage::Train,
            format!("no valid {} observations for {}; table is all zeros", channel, class),
            channel = channel.as_str(),
            class = class.as_str()
        );
    }
    log_event!(
        ctx,
        INFO,
        event_names::TRAIN_TABLE_BUILT,
        Stage::Train,
        "likelihood tables built",
        channel = channel.as_str(),
        width = built.tables.width(),
        bird_observations = built.bird_observations,
        plane_observations = built.plane_observations
    );
    TrainSummary {
        channel,
        output: output.to_path_buf(),
        width: built.tables.width(),
        tracks,
        bird_observations: built.bird_observations,
        plane_observations: built.plane_observations,
        empty_classes: built.empty_classes(),
    }
}

/// Build variation likelihoods from `training` and variation data from
/// `test`. Both outputs are computed before either file is written.
pub fn generate_variation(
    training: &Path,
    test: &Path,
    variation_data_out: &Path,
    variation_likelihoods_out: &Path,
    config: &ClassifierConfig,
    ctx: &LogContext,
) -> Result<GenVarSummary> {
    let tracking = config.variation.tracking;
    let training_tracks: Vec<Vec<ObservationToken>> = read_reading_tracks(training, &config.data)?
        .iter()
        .map(|r| variation_tokens(r, tracking))
        .collect();
    let test_tracks: Vec<Vec<ObservationToken>> = read_reading_tracks(test, &config.data)?
        .iter()
        .map(|r| variation_tokens(r, tracking))
        .collect();

    let built = TableBuilder::from_labeled_tracks(
        Channel::Variation,
        config.variation.table_width,
        &training_tracks,
    )
    .map_err(|e| build_error(training, e))?;
    let likelihoods = summarize(&built, variation_likelihoods_out, training_tracks.len(), ctx);

    write_table_pair(
        variation_likelihoods_out,
        built.tables.bird.values(),
        built.tables.plane.values(),
    )?;
    write_variation_tracks(
        variation_data_out,
        &test_tracks,
        config.data.variation_missing_value,
    )?;
    log_event!(
        ctx,
        INFO,
        event_names::TRAIN_OUTPUT_WRITTEN,
        Stage::Train,
        "variation outputs written",
        test_tracks = test_tracks.len()
    );

    Ok(GenVarSummary {
        likelihoods,
        variation_data: variation_data_out.to_path_buf(),
        test_tracks: test_tracks.len(),
    })
}

/// Build speed likelihoods of `width` bins from `training`.
pub fn train_speed(
    training: &Path,
    output: &Path,
    width: usize,
    config: &ClassifierConfig,
    ctx: &LogContext,
) -> Result<TrainSummary> {
    let tracks: Vec<Vec<ObservationToken>> = read_reading_tracks(training, &config.data)?
        .iter()
        .map(|r| speed_tokens(r, config.speed.bin_scale))
        .collect();

    let built = TableBuilder::from_labeled_tracks(Channel::Speed, width, &tracks)
        .map_err(|e| build_error(training, e))?;
    write_table_pair(output, built.tables.bird.values(), built.tables.plane.values())?;

    Ok(summarize(&built, output, tracks.len(), ctx))
}
