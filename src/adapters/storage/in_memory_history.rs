//! In-Memory History Store Adapter
//!
//! Stores conversation histories in memory. Useful for testing, development,
//! and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{HistoryKey, HistoryRecord, HistoryStore, HistoryStoreError};

/// In-memory storage for conversation histories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<HashMap<HistoryKey, HistoryRecord>>>,
}

impl InMemoryHistoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored histories (useful for tests).
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Get the number of stored histories.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true when no history is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self, key: &HistoryKey) -> Result<Option<HistoryRecord>, HistoryStoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn save(
        &self,
        key: &HistoryKey,
        record: HistoryRecord,
    ) -> Result<(), HistoryStoreError> {
        let mut records = self.records.write().await;
        records.insert(key.clone(), record);
        Ok(())
    }
}
