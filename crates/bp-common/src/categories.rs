//! Hypothesis classes and evidence channels.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two hypotheses a tracked object is classified into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    Bird,
    Plane,
}

impl Class {
    /// Both classes in file order (likelihood files list bird first).
    pub const ALL: [Class; 2] = [Class::Bird, Class::Plane];

    /// The competing hypothesis.
    pub fn other(self) -> Self {
        match self {
            Class::Bird => Class::Plane,
            Class::Plane => Class::Bird,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Class::Bird => "bird",
            Class::Plane => "plane",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement type contributing independent evidence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Discretized speed readings.
    Speed,
    /// Absolute change between consecutive valid speed readings.
    Variation,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Speed => "speed",
            Channel::Variation => "variation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_is_an_involution() {
        for class in Class::ALL {
            assert_ne!(class.other(), class);
            assert_eq!(class.other().other(), class);
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Class::Plane).unwrap(), "\"plane\"");
        assert_eq!(
            serde_json::to_string(&Channel::Variation).unwrap(),
            "\"variation\""
        );
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Class::Bird.to_string(), "bird");
        assert_eq!(Channel::Speed.to_string(), "speed");
    }
}
