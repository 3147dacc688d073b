//! AI capability configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI capability configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Primary model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Degraded fallback models, tried in order after the primary
    #[serde(default)]
    pub fallback_models: Vec<String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum attempts per model on rate limiting
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if the Gemini capability is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    ///
    /// A missing API key fails validation; callers treat that as "AI
    /// subsystem disabled" rather than a process-fatal error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_gemini() {
            return Err(ValidationError::NoAiProviderConfigured);
        }

        if self.model.is_empty() || self.fallback_models.iter().any(|m| m.is_empty()) {
            return Err(ValidationError::EmptyModelName);
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            fallback_models: Vec::new(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}
