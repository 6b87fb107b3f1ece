//! Empirical likelihood tables.
//!
//! A table maps a discretized observation to P(observation | class). There is
//! one table per (class, channel) pair. Tables are validated on construction
//! and never mutated afterwards.

pub mod builder;

pub use builder::{BuildError, BuiltTables, TableBuilder};

use bp_common::{Channel, Class};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::data::TablePair;
use crate::evidence::ObservationToken;

/// Invalid table contents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("table is empty")]
    Empty,

    #[error("entry {index} is {value}, outside [0, 1]")]
    EntryOutOfRange { index: usize, value: f64 },

    #[error("bird table has {bird} entries but plane table has {plane}")]
    WidthMismatch { bird: usize, plane: usize },
}

/// Result of looking a token up in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    Value(f64),
    Missing,
    /// The token's bin lies outside the table.
    OutOfRange(i64),
}

/// Immutable per-bin probabilities. Entries need not sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodTable {
    values: Vec<f64>,
}

impl LikelihoodTable {
    pub fn new(values: Vec<f64>) -> Result<Self, TableError> {
        if values.is_empty() {
            return Err(TableError::Empty);
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !bp_math::is_probability(**v))
        {
            return Err(TableError::EntryOutOfRange { index, value });
        }
        Ok(LikelihoodTable { values })
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: i64) -> Option<f64> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn lookup(&self, token: ObservationToken) -> Lookup {
        match token {
            ObservationToken::Missing => Lookup::Missing,
            ObservationToken::Present(i) => match self.get(i) {
                Some(v) => Lookup::Value(v),
                None => Lookup::OutOfRange(i),
            },
        }
    }

    /// Total probability mass.
    pub fn mass(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn nonzero_bins(&self) -> usize {
        self.values.iter().filter(|v| **v > 0.0).count()
    }
}

/// Bird and plane tables for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTables {
    pub channel: Channel,
    pub bird: LikelihoodTable,
    pub plane: LikelihoodTable,
}

impl ChannelTables {
    pub fn new(
        channel: Channel,
        bird: LikelihoodTable,
        plane: LikelihoodTable,
    ) -> Result<Self, TableError> {
        if bird.width() != plane.width() {
            return Err(TableError::WidthMismatch {
                bird: bird.width(),
                plane: plane.width(),
            });
        }
        Ok(ChannelTables {
            channel,
            bird,
            plane,
        })
    }

    pub fn from_pair(channel: Channel, pair: TablePair) -> Result<Self, TableError> {
        Self::new(
            channel,
            LikelihoodTable::new(pair.bird)?,
            LikelihoodTable::new(pair.plane)?,
        )
    }

    pub fn for_class(&self, class: Class) -> &LikelihoodTable {
        match class {
            Class::Bird => &self.bird,
            Class::Plane => &self.plane,
        }
    }

    pub fn width(&self) -> usize {
        self.bird.width()
    }

    /// SHA-256 over both tables, for reports.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for class in Class::ALL {
            for v in self.for_class(class).values() {
                hasher.update(v.to_le_bytes());
            }
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// The four tables used by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodModel {
    pub speed: ChannelTables,
    pub variation: ChannelTables,
}

impl LikelihoodModel {
    pub fn channel(&self, channel: Channel) -> &ChannelTables {
        match channel {
            Channel::Speed => &self.speed,
            Channel::Variation => &self.variation,
        }
    }
}

impl From<TableError> for bp_common::Error {
    fn from(err: TableError) -> Self {
        bp_common::Error::InvalidTable(err.to_string())
    }
}
