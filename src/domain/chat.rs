//! Chat replies.

use serde::{Deserialize, Serialize};

/// Fixed apology shown when the tutor cannot produce a proper reply.
pub const APOLOGY_EN: &str = "I'm sorry, there was a connection error.";
/// Arabic counterpart of [`APOLOGY_EN`].
pub const APOLOGY_AR: &str = "عذراً، حدث خطأ في الاتصال.";

/// A tutor reply to one chat turn.
///
/// `message` carries the natural-language answer, `message_ar` the Arabic
/// rendering, and `suggestions` up to three short follow-up prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub message_ar: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ChatReply {
    /// Creates a new reply.
    pub fn new(
        message: impl Into<String>,
        message_ar: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            message: message.into(),
            message_ar: message_ar.into(),
            suggestions,
        }
    }

    /// The fixed degraded payload: chat never surfaces a hard error to the
    /// learner.
    pub fn apology() -> Self {
        Self::new(APOLOGY_EN, APOLOGY_AR, Vec::new())
    }
}
