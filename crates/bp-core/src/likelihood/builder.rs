//! Likelihood tables from labeled training tracks.
//!
//! The builder is channel-generic: it counts tokens per class and divides by
//! the class's number of valid observations. Index 0 of each track is never
//! counted, matching the updater, which never consumes index 0 as evidence.

use bp_common::{Channel, Class};
use thiserror::Error;

use super::{ChannelTables, LikelihoodTable, TableError};
use crate::evidence::ObservationToken;

/// Errors raised while building tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("training data needs a non-zero, even track count (birds then planes), found {0}")]
    TrackCount(usize),

    #[error("track {track}, step {step}: bin {value} is outside table width {width}")]
    BinOutOfRange {
        /// 1-based track (line) number.
        track: usize,
        /// 0-based step within the track.
        step: usize,
        value: i64,
        width: usize,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Per-class counters of fixed width.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    channel: Channel,
    width: usize,
    bird_counts: Vec<u64>,
    plane_counts: Vec<u64>,
    bird_total: u64,
    plane_total: u64,
}

/// Tables plus the counts behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTables {
    pub tables: ChannelTables,
    pub bird_observations: u64,
    pub plane_observations: u64,
}

impl BuiltTables {
    /// Classes that contributed no observation (their table is all zeros).
    pub fn empty_classes(&self) -> Vec<Class> {
        Class::ALL
            .into_iter()
            .filter(|c| self.observations(*c) == 0)
            .collect()
    }

    pub fn observations(&self, class: Class) -> u64 {
        match class {
            Class::Bird => self.bird_observations,
            Class::Plane => self.plane_observations,
        }
    }
}

impl TableBuilder {
    pub fn new(channel: Channel, width: usize) -> Self {
        TableBuilder {
            channel,
            width,
            bird_counts: vec![0; width],
            plane_counts: vec![0; width],
            bird_total: 0,
            plane_total: 0,
        }
    }

    /// Count one track's tokens for `class`. `track` is the 1-based line
    /// number used in error messages.
    pub fn observe(
        &mut self,
        class: Class,
        tokens: &[ObservationToken],
        track: usize,
    ) -> Result<(), BuildError> {
        let width = self.width;
        let (counts, total) = match class {
            Class::Bird => (&mut self.bird_counts, &mut self.bird_total),
            Class::Plane => (&mut self.plane_counts, &mut self.plane_total),
        };
        for (step, token) in tokens.iter().enumerate().skip(1) {
            let Some(value) = token.index() else {
                continue;
            };
            let bin = usize::try_from(value)
                .ok()
                .filter(|b| *b < width)
                .ok_or(BuildError::BinOutOfRange {
                    track,
                    step,
                    value,
                    width,
                })?;
            counts[bin] += 1;
            *total += 1;
        }
        Ok(())
    }

    /// Normalize counts into tables. A class with no observations yields an
    /// all-zero table.
    pub fn build(self) -> Result<BuiltTables, BuildError> {
        let normalize = |counts: Vec<u64>, total: u64| -> Vec<f64> {
            if total == 0 {
                return vec![0.0; counts.len()];
            }
            counts
                .into_iter()
                .map(|c| c as f64 / total as f64)
                .collect()
        };
        let bird = LikelihoodTable::new(normalize(self.bird_counts, self.bird_total))?;
        let plane = LikelihoodTable::new(normalize(self.plane_counts, self.plane_total))?;
        Ok(BuiltTables {
            tables: ChannelTables::new(self.channel, bird, plane)?,
            bird_observations: self.bird_total,
            plane_observations: self.plane_total,
        })
    }

    /// Build from tracks where the first half are birds and the second half
    /// planes.
    pub fn from_labeled_tracks(
        channel: Channel,
        width: usize,
        tracks: &[Vec<ObservationToken>],
    ) -> Result<BuiltTables, BuildError> {
        if tracks.is_empty() || tracks.len() % 2 != 0 {
            return Err(BuildError::TrackCount(tracks.len()));
        }
        let half = tracks.len() / 2;
        let mut builder = TableBuilder::new(channel, width);
        for (i, track) in tracks.iter().enumerate() {
            let class = if i < half { Class::Bird } else { Class::Plane };
            builder.observe(class, track, i + 1)?;
        }
        builder.build()
    }
}
