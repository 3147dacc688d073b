//! Resilient Generator - retry, timeout, and model fallback around the
//! text-generation capability.
//!
//! Wraps any [`TextGenerator`] with:
//!
//! - a per-call wall-clock timeout (generous, to accommodate large few-shot
//!   prompts); expiry counts as `Unavailable` and is not retried,
//! - bounded retry with linear-multiple backoff on `RateLimited`
//!   (base × attempt index: 2s, 4s, 6s, ...); any other failure ends the
//!   model's attempts immediately,
//! - an ordered model fallback chain (primary, then degraded fallbacks),
//!   fixed at construction and never renegotiated per call.
//!
//! `RateLimited` never escapes this wrapper: callers observe either the
//! generated text or a terminal `Unavailable`.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::prompt::Prompt;
use crate::ports::{GenerateError, GenerateRequest, ModelId, TextGenerator};

/// Retry and timeout configuration for one capability call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per model (including the first).
    pub max_attempts: u32,
    /// Backoff base; the delay before attempt n+1 is `base × n`.
    pub base_delay: Duration,
    /// Wall-clock bound on each individual attempt.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempt count.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the backoff base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Ordered fallback chain of model identifiers.
///
/// Selection is static per orchestrator instance, chosen once at startup.
#[derive(Debug, Clone)]
pub struct ModelChain {
    models: Vec<ModelId>,
}

impl ModelChain {
    /// Creates a chain with only a primary model.
    pub fn new(primary: ModelId) -> Self {
        Self {
            models: vec![primary],
        }
    }

    /// Appends a degraded fallback model.
    pub fn with_fallback(mut self, model: ModelId) -> Self {
        self.models.push(model);
        self
    }

    /// Returns the models in fallback order.
    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// Returns the primary model.
    pub fn primary(&self) -> &ModelId {
        &self.models[0]
    }
}

/// One attempt against the capability; discarded when the call resolves.
#[derive(Debug)]
struct AiAttempt {
    model: ModelId,
    attempt: u32,
    outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptOutcome {
    Succeeded,
    RateLimited,
    Unavailable,
}

/// Retry/timeout/fallback wrapper around a [`TextGenerator`].
pub struct ResilientGenerator {
    inner: Arc<dyn TextGenerator>,
    chain: ModelChain,
    policy: RetryPolicy,
}

impl ResilientGenerator {
    /// Creates a wrapper with the default policy.
    pub fn new(inner: Arc<dyn TextGenerator>, chain: ModelChain) -> Self {
        Self {
            inner,
            chain,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configured model chain.
    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    /// Generates text for a composed prompt, applying retry, timeout, and
    /// model fallback. Resolves to the text or a terminal `Unavailable`.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        let request_id = uuid::Uuid::new_v4();
        let mut attempts: Vec<AiAttempt> = Vec::new();

        for (index, model) in self.chain.models().iter().enumerate() {
            if index > 0 {
                tracing::warn!(%request_id, model = %model, "falling back to degraded model");
            }

            match self.try_model(model, prompt, request_id, &mut attempts).await {
                Ok(text) => return Ok(text),
                Err(error) => {
                    tracing::debug!(%request_id, model = %model, %error, "model exhausted");
                }
            }
        }

        tracing::warn!(
            %request_id,
            attempts = attempts.len(),
            last = ?attempts.last(),
            "capability unavailable after exhausting the model chain"
        );
        Err(GenerateError::unavailable("all configured models exhausted"))
    }

    /// Runs the retry loop for one model. Returns `Unavailable` when the
    /// retry budget is spent or the model fails with a non-retryable error.
    async fn try_model(
        &self,
        model: &ModelId,
        prompt: &Prompt,
        request_id: uuid::Uuid,
        attempts: &mut Vec<AiAttempt>,
    ) -> Result<String, GenerateError> {
        for attempt in 1..=self.policy.max_attempts {
            let request = GenerateRequest::new(prompt.text.clone(), model.clone(), prompt.shape);

            let result =
                match tokio::time::timeout(self.policy.call_timeout, self.inner.generate(request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(GenerateError::unavailable(format!(
                        "call timed out after {}s",
                        self.policy.call_timeout.as_secs()
                    ))),
                };

            match result {
                Ok(text) => {
                    attempts.push(AiAttempt {
                        model: model.clone(),
                        attempt,
                        outcome: AttemptOutcome::Succeeded,
                    });
                    tracing::debug!(%request_id, model = %model, attempt, "generation succeeded");
                    return Ok(text);
                }
                Err(GenerateError::RateLimited { retry_after_secs }) => {
                    attempts.push(AiAttempt {
                        model: model.clone(),
                        attempt,
                        outcome: AttemptOutcome::RateLimited,
                    });
                    if attempt == self.policy.max_attempts {
                        return Err(GenerateError::unavailable(
                            "retry budget exhausted while rate limited",
                        ));
                    }
                    let delay = self.policy.base_delay * attempt;
                    tracing::debug!(
                        %request_id,
                        model = %model,
                        attempt,
                        retry_after_secs,
                        backoff_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    sleep(delay).await;
                }
                Err(error) => {
                    attempts.push(AiAttempt {
                        model: model.clone(),
                        attempt,
                        outcome: AttemptOutcome::Unavailable,
                    });
                    return Err(error);
                }
            }
        }

        Err(GenerateError::unavailable("retry budget exhausted"))
    }
}
