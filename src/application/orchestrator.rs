//! Orchestrator - the public operations of the AI tutoring engine.
//!
//! Composes prompt composition, the resilient capability wrapper, the
//! response contract, the heuristic grader, and the conversation store into
//! the public operations, each with its own failure policy:
//!
//! - `chat` never fails to the boundary (fixed apology payload instead),
//! - `grade_code` never fails to the boundary (heuristic fallback instead),
//! - `generate_problem` and `review_solution` surface typed failures.
//!
//! An orchestrator is explicitly constructed and dependency-injected; there
//! is no process-wide AI client state. When the capability is not
//! configured, the orchestrator runs in degraded mode: chat apologizes,
//! grading goes heuristic, generation reports `Unavailable`.

use std::sync::Arc;
use thiserror::Error;

use crate::adapters::{
    GeminiConfig, GeminiGenerator, ModelChain, ResilientGenerator, RetryPolicy,
};
use crate::config::AppConfig;
use crate::domain::contract::{self, ContractError};
use crate::domain::heuristics::HeuristicGrader;
use crate::domain::prompt::{self, ChatContext, GradingContext};
use crate::domain::{
    ChatReply, Difficulty, GeneratedProblem, GradeResult, Message, Topic, Track, UserId,
    ValidationError,
};
use crate::ports::{GenerateError, HistoryKey, HistoryStore, HistoryStoreError, ModelId};

use super::ConversationStore;

/// Failures surfaced by `generate_problem` and `review_solution`.
///
/// `chat` and `grade_code` absorb every internal failure, and rate limiting
/// is absorbed by the retry wrapper, so neither appears here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// The capability cannot be reached or is not configured.
    #[error("AI capability unavailable: {message}")]
    Unavailable { message: String },

    /// The capability answered, but its output could not be repaired into
    /// the requested schema.
    #[error("AI response did not match the expected schema: {message}")]
    MalformedResponse { message: String },

    /// Caller-supplied input outside the enumerated set; rejected before
    /// any AI call.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<GenerateError> for OrchestratorError {
    fn from(error: GenerateError) -> Self {
        // RateLimited is absorbed by the retry wrapper; mapping it here is
        // for totality only.
        Self::Unavailable {
            message: error.to_string(),
        }
    }
}

impl From<ContractError> for OrchestratorError {
    fn from(error: ContractError) -> Self {
        Self::MalformedResponse {
            message: error.to_string(),
        }
    }
}

/// One chat turn, as received from the boundary layer.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Learning track; selects persona and history key.
    pub track: Track,
    /// Authenticated caller, or `None` for guests.
    pub user: Option<UserId>,
    /// The learner's message.
    pub message: String,
    /// Problem statement the learner is looking at, if any.
    pub problem_context: Option<String>,
    /// Code the learner is currently working on, if any.
    pub code_context: Option<String>,
    /// Selected hardware project (robotics track), if any.
    pub project_context: Option<String>,
}

impl ChatTurn {
    /// Creates a guest turn with no optional context.
    pub fn new(track: Track, message: impl Into<String>) -> Self {
        Self {
            track,
            user: None,
            message: message.into(),
            problem_context: None,
            code_context: None,
            project_context: None,
        }
    }

    /// Attaches the authenticated caller.
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Attaches problem context.
    pub fn with_problem_context(mut self, context: impl Into<String>) -> Self {
        self.problem_context = Some(context.into());
        self
    }

    /// Attaches code context.
    pub fn with_code_context(mut self, context: impl Into<String>) -> Self {
        self.code_context = Some(context.into());
        self
    }

    /// Attaches project context.
    pub fn with_project_context(mut self, context: impl Into<String>) -> Self {
        self.project_context = Some(context.into());
        self
    }
}

/// The AI tutoring engine.
pub struct Orchestrator {
    ai: Option<ResilientGenerator>,
    store: ConversationStore,
}

impl Orchestrator {
    /// Creates an orchestrator with the AI subsystem disabled.
    pub fn new(store: ConversationStore) -> Self {
        Self { ai: None, store }
    }

    /// Attaches the resilient capability wrapper.
    pub fn with_generator(mut self, generator: ResilientGenerator) -> Self {
        self.ai = Some(generator);
        self
    }

    /// Builds an orchestrator from application configuration.
    ///
    /// A missing or invalid AI configuration disables the AI subsystem
    /// (logged once); history handling keeps working either way.
    pub fn from_config(config: &AppConfig, backend: Arc<dyn HistoryStore>) -> Self {
        let store = ConversationStore::new(backend, config.chat.history_cap);

        match config.ai.validate() {
            Ok(()) => {
                let api_key = config.ai.gemini_api_key.clone().unwrap_or_default();
                let gemini =
                    GeminiGenerator::new(GeminiConfig::new(api_key).with_timeout(config.ai.timeout()));

                let mut chain = ModelChain::new(ModelId::new(&config.ai.model));
                for model in &config.ai.fallback_models {
                    chain = chain.with_fallback(ModelId::new(model));
                }

                let policy = RetryPolicy::new()
                    .with_max_attempts(config.ai.max_retries)
                    .with_call_timeout(config.ai.timeout());

                tracing::info!(model = %config.ai.model, "AI subsystem enabled");
                Self::new(store).with_generator(
                    ResilientGenerator::new(Arc::new(gemini), chain).with_policy(policy),
                )
            }
            Err(error) => {
                tracing::warn!(%error, "AI subsystem disabled, running in degraded mode");
                Self::new(store)
            }
        }
    }

    /// Returns whether the AI subsystem is enabled.
    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// One tutoring chat turn.
    ///
    /// Never fails to the boundary: any internal failure yields the fixed
    /// apology payload with empty suggestions. On success, authenticated
    /// turns append the user message and the tutor reply to the caller's
    /// history in one serialized batch; guests get single-turn context only.
    pub async fn chat(&self, turn: &ChatTurn) -> ChatReply {
        let Some(ai) = &self.ai else {
            tracing::debug!("chat requested while AI subsystem is disabled");
            return ChatReply::apology();
        };

        let key = turn
            .user
            .clone()
            .map(|user| HistoryKey::new(user, turn.track));

        let history = match &key {
            Some(key) => match self.store.read(key).await {
                Ok(messages) => messages,
                Err(error) => {
                    tracing::warn!(%error, "failed to load chat history, continuing without it");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut context = ChatContext::new().with_history(history);
        if let Some(problem) = &turn.problem_context {
            context = context.with_problem_context(problem);
        }
        if let Some(code) = &turn.code_context {
            context = context.with_code_context(code);
        }
        if let Some(project) = &turn.project_context {
            context = context.with_project_context(project);
        }

        let prompt = prompt::compose_chat(turn.track, &turn.message, &context);

        let raw = match ai.generate(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "chat generation failed, returning apology");
                return ChatReply::apology();
            }
        };

        let decoded = match contract::decode_chat(&raw) {
            Ok(decoded) => decoded,
            Err(error) => {
                tracing::warn!(%error, "chat reply failed the response contract");
                return ChatReply::apology();
            }
        };
        if !decoded.backfilled.is_empty() {
            tracing::warn!(keys = ?decoded.backfilled, "chat reply backfilled missing keys");
        }
        let reply = decoded.value;

        if let Some(key) = &key {
            let batch = vec![
                Message::user(&turn.message),
                Message::assistant(&reply.message),
            ];
            if let Err(error) = self.store.append(key, batch).await {
                tracing::warn!(%error, "failed to append chat history");
            }
        }

        reply
    }

    /// Generates a fresh competitive-programming-style problem.
    ///
    /// Topic and difficulty are validated before any AI call. Callers that
    /// prefer a degraded experience over an error can present
    /// [`GeneratedProblem::fallback`] on failure.
    pub async fn generate_problem(
        &self,
        topic: &str,
        difficulty: &str,
    ) -> Result<GeneratedProblem, OrchestratorError> {
        let topic = Topic::new(topic)?;
        let difficulty: Difficulty = difficulty.parse()?;

        let Some(ai) = &self.ai else {
            return Err(OrchestratorError::Unavailable {
                message: "AI capability is not configured".to_string(),
            });
        };

        let prompt = prompt::compose_generation(&topic, difficulty);
        let raw = ai.generate(&prompt).await?;
        let decoded = contract::decode_problem(&raw)?;

        tracing::debug!(topic = %topic, difficulty = %difficulty, title = %decoded.value.title,
            "problem generated");
        Ok(decoded.value)
    }

    /// Grades a code submission.
    ///
    /// Never fails to the boundary: when the capability is unavailable or
    /// its output cannot be repaired, the deterministic heuristic grader
    /// answers instead.
    pub async fn grade_code(&self, submission: &GradingContext) -> GradeResult {
        let Some(ai) = &self.ai else {
            tracing::debug!("grading requested while AI subsystem is disabled");
            return HeuristicGrader::grade(&submission.code, &submission.problem_description);
        };

        let prompt = prompt::compose_grading(submission);

        let raw = match ai.generate(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "grading generation failed, falling back to heuristics");
                return HeuristicGrader::grade(&submission.code, &submission.problem_description);
            }
        };

        match contract::decode_grade(&raw) {
            Ok(decoded) => {
                if !decoded.backfilled.is_empty() {
                    tracing::warn!(keys = ?decoded.backfilled, "grade reply backfilled missing keys");
                }
                decoded.value
            }
            Err(error) => {
                tracing::warn!(%error, "grade reply failed the response contract, falling back to heuristics");
                HeuristicGrader::grade(&submission.code, &submission.problem_description)
            }
        }
    }

    /// Reviews a solution in free-form markdown.
    pub async fn review_solution(
        &self,
        problem_context: &str,
        code: &str,
    ) -> Result<String, OrchestratorError> {
        let Some(ai) = &self.ai else {
            return Err(OrchestratorError::Unavailable {
                message: "AI capability is not configured".to_string(),
            });
        };

        let prompt = prompt::compose_review(problem_context, code);
        Ok(ai.generate(&prompt).await?)
    }

    /// Clears a caller's history for one track.
    pub async fn clear_history(
        &self,
        user: &UserId,
        track: Track,
    ) -> Result<(), HistoryStoreError> {
        let key = HistoryKey::new(user.clone(), track);
        self.store.clear(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryHistoryStore, MockTextGenerator};
    use crate::domain::GradeStatus;
    use std::time::Duration;

    fn orchestrator_with(mock: &MockTextGenerator, backend: InMemoryHistoryStore) -> Orchestrator {
        let store = ConversationStore::new(Arc::new(backend), 50);
        let generator = ResilientGenerator::new(
            Arc::new(mock.clone()),
            ModelChain::new(ModelId::new("mock-model")),
        )
        .with_policy(
            RetryPolicy::new()
                .with_base_delay(Duration::from_millis(1))
                .with_call_timeout(Duration::from_millis(500)),
        );
        Orchestrator::new(store).with_generator(generator)
    }

    fn chat_reply_json() -> String {
        serde_json::json!({
            "message_en": "A loop repeats statements.",
            "message_ar": "الحلقة تكرر التعليمات.",
            "suggestions": ["Show me a for loop"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn guest_chat_succeeds_without_touching_history() {
        let mock = MockTextGenerator::new().with_text(chat_reply_json());
        let backend = InMemoryHistoryStore::new();
        let orchestrator = orchestrator_with(&mock, backend.clone());

        let reply = orchestrator
            .chat(&ChatTurn::new(Track::ProblemSolving, "What is a loop?"))
            .await;

        assert_eq!(reply.message, "A loop repeats statements.");
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn authenticated_chat_appends_both_messages() {
        let mock = MockTextGenerator::new().with_text(chat_reply_json());
        let backend = InMemoryHistoryStore::new();
        let orchestrator = orchestrator_with(&mock, backend.clone());
        let user = UserId::new("student-7").unwrap();

        let turn = ChatTurn::new(Track::ProblemSolving, "What is a loop?").with_user(user.clone());
        orchestrator.chat(&turn).await;

        let key = HistoryKey::new(user, Track::ProblemSolving);
        let record = backend.load(&key).await.unwrap().unwrap();
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[0], Message::user("What is a loop?"));
        assert_eq!(
            record.messages[1],
            Message::assistant("A loop repeats statements.")
        );
    }

    #[tokio::test]
    async fn chat_includes_stored_history_in_prompt() {
        let mock = MockTextGenerator::new().with_text(chat_reply_json());
        let backend = InMemoryHistoryStore::new();
        let orchestrator = orchestrator_with(&mock, backend.clone());
        let user = UserId::new("student-7").unwrap();
        let key = HistoryKey::new(user.clone(), Track::ProblemSolving);

        backend
            .save(
                &key,
                crate::ports::HistoryRecord::new(vec![
                    Message::user("earlier question"),
                    Message::assistant("earlier answer"),
                ]),
            )
            .await
            .unwrap();

        let turn = ChatTurn::new(Track::ProblemSolving, "follow-up").with_user(user);
        orchestrator.chat(&turn).await;

        let prompt = &mock.get_calls()[0].prompt;
        assert!(prompt.contains("User: earlier question"));
        assert!(prompt.contains("Assistant: earlier answer"));
    }

    #[tokio::test]
    async fn chat_without_ai_returns_apology() {
        let store = ConversationStore::new(Arc::new(InMemoryHistoryStore::new()), 50);
        let orchestrator = Orchestrator::new(store);

        let reply = orchestrator
            .chat(&ChatTurn::new(Track::Robotics, "wire an LED"))
            .await;

        assert_eq!(reply, ChatReply::apology());
        assert!(!orchestrator.ai_enabled());
    }

    #[tokio::test]
    async fn chat_with_unusable_reply_returns_apology_and_skips_append() {
        let mock = MockTextGenerator::new().with_text("not json at all");
        let backend = InMemoryHistoryStore::new();
        let orchestrator = orchestrator_with(&mock, backend.clone());
        let user = UserId::new("student-7").unwrap();

        let turn = ChatTurn::new(Track::ProblemSolving, "hi").with_user(user);
        let reply = orchestrator.chat(&turn).await;

        assert_eq!(reply, ChatReply::apology());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn generate_problem_validates_before_calling_ai() {
        let mock = MockTextGenerator::new();
        let orchestrator = orchestrator_with(&mock, InMemoryHistoryStore::new());

        let err = orchestrator
            .generate_problem("", "Easy")
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Validation(_)));

        let err = orchestrator
            .generate_problem("Arrays", "Impossible")
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Validation(_)));

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn generate_problem_without_ai_is_unavailable() {
        let store = ConversationStore::new(Arc::new(InMemoryHistoryStore::new()), 50);
        let orchestrator = Orchestrator::new(store);

        let err = orchestrator
            .generate_problem("Arrays", "Easy")
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn generate_problem_surfaces_malformed_output() {
        let mock = MockTextGenerator::new().with_text(r#"{"title": "missing the rest"}"#);
        let orchestrator = orchestrator_with(&mock, InMemoryHistoryStore::new());

        let err = orchestrator
            .generate_problem("Arrays", "Easy")
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn grade_code_without_ai_uses_heuristics() {
        let store = ConversationStore::new(Arc::new(InMemoryHistoryStore::new()), 50);
        let orchestrator = Orchestrator::new(store);

        let submission = GradingContext {
            code: String::new(),
            problem_description: "Any problem".to_string(),
            constraints: None,
            sample_io: Vec::new(),
        };
        let result = orchestrator.grade_code(&submission).await;

        assert_eq!(result.status, GradeStatus::WrongAnswer);
        assert!(result.hint.is_some());
    }

    #[tokio::test]
    async fn grade_code_prefers_ai_verdict() {
        let mock = MockTextGenerator::new().with_text(
            serde_json::json!({
                "status": "LOGIC_ERROR",
                "is_correct": false,
                "feedback_en": "Off by one.",
                "feedback_ar": "خطأ بمقدار واحد.",
                "hint": "Check the loop bound."
            })
            .to_string(),
        );
        let orchestrator = orchestrator_with(&mock, InMemoryHistoryStore::new());

        let submission = GradingContext {
            code: "int main() { cout << 1; }".to_string(),
            problem_description: "Count things".to_string(),
            constraints: None,
            sample_io: Vec::new(),
        };
        let result = orchestrator.grade_code(&submission).await;

        assert_eq!(result.status, GradeStatus::LogicError);
        assert_eq!(result.hint.as_deref(), Some("Check the loop bound."));
    }

    #[tokio::test]
    async fn review_solution_returns_markdown() {
        let mock = MockTextGenerator::new().with_text("## Review\nLooks fine.");
        let orchestrator = orchestrator_with(&mock, InMemoryHistoryStore::new());

        let review = orchestrator
            .review_solution("Sum problem", "int main() {}")
            .await
            .unwrap();
        assert!(review.starts_with("## Review"));
    }

    #[tokio::test]
    async fn clear_history_empties_the_track() {
        let mock = MockTextGenerator::new().with_text(chat_reply_json());
        let backend = InMemoryHistoryStore::new();
        let orchestrator = orchestrator_with(&mock, backend.clone());
        let user = UserId::new("student-7").unwrap();

        let turn = ChatTurn::new(Track::ProblemSolving, "hi").with_user(user.clone());
        orchestrator.chat(&turn).await;
        orchestrator
            .clear_history(&user, Track::ProblemSolving)
            .await
            .unwrap();

        let key = HistoryKey::new(user, Track::ProblemSolving);
        let record = backend.load(&key).await.unwrap().unwrap();
        assert!(record.messages.is_empty());
    }

    #[tokio::test]
    async fn from_config_without_key_disables_ai() {
        let config = AppConfig::default();
        let orchestrator =
            Orchestrator::from_config(&config, Arc::new(InMemoryHistoryStore::new()));
        assert!(!orchestrator.ai_enabled());
    }

    #[tokio::test]
    async fn from_config_with_key_enables_ai() {
        let config = AppConfig {
            ai: crate::config::AiConfig {
                gemini_api_key: Some("AIza-test".to_string()),
                fallback_models: vec!["gemini-flash-lite-latest".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let orchestrator =
            Orchestrator::from_config(&config, Arc::new(InMemoryHistoryStore::new()));
        assert!(orchestrator.ai_enabled());
    }
}
