//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `CODEBOT` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use codebot_academy::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//!
//! if config.ai.has_gemini() {
//!     println!("AI subsystem enabled with model {}", config.ai.model);
//! }
//! ```

mod ai;
mod chat;
mod error;

pub use ai::AiConfig;
pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI capability configuration (Gemini)
    #[serde(default)]
    pub ai: AiConfig,

    /// Chat history configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `CODEBOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CODEBOT__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `CODEBOT__CHAT__HISTORY_CAP=50` -> `chat.history_cap = 50`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CODEBOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values except AI availability.
    ///
    /// AI configuration is validated separately via [`AiConfig::validate`]
    /// because a missing API key only disables the AI subsystem instead of
    /// failing the whole application.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.chat.validate()
    }
}
