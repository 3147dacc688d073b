//! Mock Text Generator for testing.
//!
//! Configurable mock implementation of the TextGenerator port, allowing
//! tests to run without calling a real model API.
//!
//! # Features
//!
//! - Pre-configured outcomes, consumed in order
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockTextGenerator::new()
//!     .with_error(GenerateError::rate_limited(30))
//!     .with_text(r#"{"status":"ACCEPTED"}"#);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{GenerateError, GenerateRequest, TextGenerator};

/// A configured mock outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text.
    Text(String),
    /// Return this error.
    Error(GenerateError),
}

/// Mock text generator for testing.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    /// Pre-configured outcomes (consumed in order).
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTextGenerator {
    /// Creates a new mock generator with default settings.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a text outcome to the queue.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Text(text.into()));
        self
    }

    /// Adds an error outcome to the queue.
    pub fn with_error(self, error: GenerateError) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this generator.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Gets the next outcome or a default.
    fn next_outcome(&self) -> MockOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Text("Mock response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenerateError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_outcome() {
            MockOutcome::Text(text) => Ok(text),
            MockOutcome::Error(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::ResponseShape;
    use crate::ports::ModelId;

    fn test_request() -> GenerateRequest {
        GenerateRequest::new("prompt", ModelId::new("mock-model"), ResponseShape::FreeText)
    }

    #[tokio::test]
    async fn mock_returns_outcomes_in_order() {
        let generator = MockTextGenerator::new()
            .with_text("first")
            .with_error(GenerateError::rate_limited(5))
            .with_text("third");

        assert_eq!(generator.generate(test_request()).await.unwrap(), "first");
        assert!(generator.generate(test_request()).await.is_err());
        assert_eq!(generator.generate(test_request()).await.unwrap(), "third");
    }

    #[tokio::test]
    async fn mock_returns_default_after_exhausted() {
        let generator = MockTextGenerator::new().with_text("only one");

        generator.generate(test_request()).await.unwrap();
        let second = generator.generate(test_request()).await.unwrap();
        assert_eq!(second, "Mock response");
    }

    #[tokio::test]
    async fn mock_tracks_calls() {
        let generator = MockTextGenerator::new();
        assert_eq!(generator.call_count(), 0);

        generator.generate(test_request()).await.unwrap();
        generator.generate(test_request()).await.unwrap();
        assert_eq!(generator.call_count(), 2);
        assert_eq!(generator.get_calls()[0].prompt, "prompt");

        generator.clear_calls();
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn mock_respects_delay() {
        let generator = MockTextGenerator::new()
            .with_text("slow")
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        generator.generate(test_request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
