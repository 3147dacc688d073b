//! Validation errors for caller-supplied input.

use thiserror::Error;

/// Errors raised when caller-supplied input falls outside the enumerated or
/// bounded sets the domain accepts.
///
/// Validation happens at the boundary of each public operation, before any
/// AI capability call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The track is not one of the enumerated learning tracks.
    #[error("unknown track: {0}")]
    UnknownTrack(String),

    /// The difficulty is not one of Easy, Medium, or Hard.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// The topic exceeds the accepted length.
    #[error("topic too long: {len} characters exceeds {max} limit")]
    TopicTooLong {
        /// Actual character count.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl ValidationError {
    /// Creates an empty-field error.
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_correctly() {
        assert_eq!(
            ValidationError::empty_field("user_id").to_string(),
            "user_id must not be empty"
        );
        assert_eq!(
            ValidationError::UnknownTrack("chemistry".to_string()).to_string(),
            "unknown track: chemistry"
        );
        assert_eq!(
            ValidationError::TopicTooLong { len: 500, max: 200 }.to_string(),
            "topic too long: 500 characters exceeds 200 limit"
        );
    }
}
