//! History Store Port - Persistence surface for conversation history.
//!
//! The backing store exposes already-consistent point reads and writes per
//! key. The per-key serialization that prevents lost updates is layered on
//! top by the application's `ConversationStore`; adapters only need to be
//! internally thread safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Message, Track, UserId};

/// Key owning one conversation history: a (user, track) pair.
///
/// Histories are never shared across tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub user: UserId,
    pub track: Track,
}

impl HistoryKey {
    /// Creates a new key.
    pub fn new(user: UserId, track: Track) -> Self {
        Self { user, track }
    }
}

/// A stored conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Ordered messages, oldest first.
    pub messages: Vec<Message>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Creates a record stamped with the current time.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            updated_at: Utc::now(),
        }
    }

    /// Creates an empty record.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Port for loading and saving conversation histories.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Loads the history for a key; `None` if no history exists yet.
    async fn load(&self, key: &HistoryKey) -> Result<Option<HistoryRecord>, HistoryStoreError>;

    /// Saves the history for a key, replacing any previous record.
    async fn save(&self, key: &HistoryKey, record: HistoryRecord)
        -> Result<(), HistoryStoreError>;
}

/// History store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryStoreError {
    /// The backing store could not serve the request.
    #[error("history backend unavailable: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_per_track() {
        let user = UserId::new("student-7").unwrap();
        let a = HistoryKey::new(user.clone(), Track::ProblemSolving);
        let b = HistoryKey::new(user, Track::Robotics);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_record_has_no_messages() {
        let record = HistoryRecord::empty();
        assert!(record.messages.is_empty());
    }
}
