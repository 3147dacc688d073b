//! Adapters - Implementations of the ports.

pub mod ai;
pub mod storage;

pub use ai::{
    GeminiConfig, GeminiGenerator, MockOutcome, MockTextGenerator, ModelChain,
    ResilientGenerator, RetryPolicy,
};
pub use storage::InMemoryHistoryStore;
