//! Storage Adapters.
//!
//! Implementations of the HistoryStore port.

mod in_memory_history;

pub use in_memory_history::InMemoryHistoryStore;
