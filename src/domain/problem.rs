//! Generated problems and their request parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::foundation::ValidationError;

/// Maximum accepted topic length in characters.
pub const MAX_TOPIC_LEN: usize = 200;

/// A worked input/output example for a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub explanation: String,
}

impl Example {
    /// Creates a new example.
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            explanation: explanation.into(),
        }
    }
}

/// A competitive-programming-style problem authored by the model.
///
/// Transient: produced fresh per request, never persisted by this crate.
/// The description uses markdown with LaTeX-style math notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProblem {
    pub title: String,
    pub description: String,
    pub input_format: String,
    pub output_format: String,
    pub examples: Vec<Example>,
    pub constraints: String,
    #[serde(default)]
    pub starter_code: String,
}

impl GeneratedProblem {
    /// A static problem callers can present when generation fails and they
    /// prefer a degraded experience over surfacing an error.
    pub fn fallback() -> Self {
        Self {
            title: "Hello, World!".to_string(),
            description: "Write a program that prints \"Hello, World!\" to the screen.\n\n\
                          This is your first C++ program! The goal is simple: print the \
                          message exactly as shown."
                .to_string(),
            input_format: "No input.".to_string(),
            output_format: "A single line containing \"Hello, World!\"".to_string(),
            examples: vec![Example::new("", "Hello, World!", "")],
            constraints: "None".to_string(),
            starter_code: "#include <iostream>\nusing namespace std;\n\nint main() {\n    \
                           // Write your code here\n    \n    return 0;\n}\n"
                .to_string(),
        }
    }
}

/// A validated problem topic (e.g. "Arrays", "Recursion").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic, rejecting empty or oversized values.
    pub fn new(topic: impl Into<String>) -> Result<Self, ValidationError> {
        let topic = topic.into();
        let trimmed = topic.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("topic"));
        }
        let len = trimmed.chars().count();
        if len > MAX_TOPIC_LEN {
            return Err(ValidationError::TopicTooLong {
                len,
                max: MAX_TOPIC_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Difficulty level for generated problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Returns the display name of the difficulty.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::UnknownDifficulty(other.to_string())),
        }
    }
}
