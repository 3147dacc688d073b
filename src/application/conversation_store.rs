//! Conversation store with per-key serialized mutation.
//!
//! A naive read-modify-write over the history backend loses messages when
//! two chat turns for the same (user, track) interleave. This store keeps a
//! registry of per-key async mutexes so `append` and `clear` observe a total
//! order within one key while distinct keys proceed fully in parallel.
//!
//! The per-key critical section spans only the backend load and save; it is
//! never held across an AI call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::Message;
use crate::ports::{HistoryKey, HistoryRecord, HistoryStore, HistoryStoreError};

/// Per-(user, track) message log with bounded size and serialized mutation.
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn HistoryStore>,
    cap: usize,
    locks: Arc<StdMutex<HashMap<HistoryKey, Arc<AsyncMutex<()>>>>>,
}

impl ConversationStore {
    /// Creates a store over a history backend, retaining at most `cap`
    /// messages per key.
    pub fn new(backend: Arc<dyn HistoryStore>, cap: usize) -> Self {
        Self {
            backend,
            cap,
            locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Returns the configured history cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Appends messages to a key's history, evicting the oldest beyond the
    /// cap. The whole batch lands atomically: a cancelled caller appends
    /// either all of it or none of it.
    pub async fn append(
        &self,
        key: &HistoryKey,
        new_messages: Vec<Message>,
    ) -> Result<(), HistoryStoreError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        let mut messages = self
            .backend
            .load(key)
            .await?
            .map(|record| record.messages)
            .unwrap_or_default();
        messages.extend(new_messages);
        if messages.len() > self.cap {
            let excess = messages.len() - self.cap;
            messages.drain(..excess);
        }

        self.backend.save(key, HistoryRecord::new(messages)).await
    }

    /// Replaces a key's history with an empty sequence.
    pub async fn clear(&self, key: &HistoryKey) -> Result<(), HistoryStoreError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        self.backend.save(key, HistoryRecord::empty()).await
    }

    /// Returns a snapshot of a key's history. Reads never take the per-key
    /// mutex, so they cannot block writers of unrelated keys.
    pub async fn read(&self, key: &HistoryKey) -> Result<Vec<Message>, HistoryStoreError> {
        Ok(self
            .backend
            .load(key)
            .await?
            .map(|record| record.messages)
            .unwrap_or_default())
    }

    /// Returns the mutex guarding a key, creating it on first use.
    fn key_lock(&self, key: &HistoryKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("lock registry poisoned");
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
