//! Learning tracks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::foundation::ValidationError;

/// The pedagogical context of a request.
///
/// Selects the tutor persona and prompt template. Immutable per request;
/// conversation history is never shared across tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// C++ logic, algorithms, and competitive programming.
    ProblemSolving,
    /// Arduino, circuits, sensors, and hardware projects.
    Robotics,
}

impl Track {
    /// Returns the wire name of the track.
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::ProblemSolving => "problem_solving",
            Track::Robotics => "robotics",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "problem_solving" => Ok(Track::ProblemSolving),
            "robotics" => Ok(Track::Robotics),
            other => Err(ValidationError::UnknownTrack(other.to_string())),
        }
    }
}
