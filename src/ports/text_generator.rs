//! Text Generator Port - Interface to the hosted generative text model.
//!
//! The capability is opaque: it takes a prompt and a requested response
//! shape and returns raw text that may or may not satisfy that shape. The
//! response contract layer assumes nothing about output fidelity.

use async_trait::async_trait;
use std::fmt;

use crate::domain::prompt::ResponseShape;

/// Port for the text-generation capability.
///
/// Implementations connect to a hosted model API (or a test double) and
/// translate transport failures into the two failure kinds the
/// orchestration layer distinguishes.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates raw text for the given request.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerateError>;
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Model identifier to use.
    pub model: ModelId,
    /// Requested response shape.
    pub shape: ResponseShape,
}

impl GenerateRequest {
    /// Creates a new request.
    pub fn new(prompt: impl Into<String>, model: ModelId, shape: ResponseShape) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            shape,
        }
    }
}

/// Identifier of a hosted model (e.g. "gemini-flash-latest").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId(String);

impl ModelId {
    /// Creates a new model identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Failure kinds of the text-generation capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// Rate limited by the provider; retryable with backoff.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// The capability cannot serve this call (server error, timeout,
    /// network failure, authentication rejection). Terminal for the call.
    #[error("capability unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

impl GenerateError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true if this error is retryable within one policy invocation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerateError::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limited_is_retryable() {
        assert!(GenerateError::rate_limited(30).is_retryable());
        assert!(!GenerateError::unavailable("down").is_retryable());
    }

    #[test]
    fn generate_error_displays_correctly() {
        assert_eq!(
            GenerateError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            GenerateError::unavailable("server error 503").to_string(),
            "capability unavailable: server error 503"
        );
    }

    #[test]
    fn model_id_round_trips() {
        let model = ModelId::new("gemini-flash-latest");
        assert_eq!(model.as_str(), "gemini-flash-latest");
        assert_eq!(model.to_string(), "gemini-flash-latest");
    }
}
