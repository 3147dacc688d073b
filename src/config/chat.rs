//! Chat and history configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Conversation history configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Messages retained per (user, track) history; oldest evicted first
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

impl ChatConfig {
    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_cap == 0 {
            return Err(ValidationError::InvalidHistoryCap);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
        }
    }
}

fn default_history_cap() -> usize {
    50
}
