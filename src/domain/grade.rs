//! Grading outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a graded submission.
///
/// Wire names follow the judge-style convention (`ACCEPTED`, `WRONG_ANSWER`,
/// ...). Unknown values coming back from the model are normalized to
/// [`GradeStatus::WrongAnswer`] by the response contract rather than failing
/// the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradeStatus {
    Accepted,
    WrongAnswer,
    SyntaxError,
    LogicError,
    RuntimeError,
}

impl GradeStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeStatus::Accepted => "ACCEPTED",
            GradeStatus::WrongAnswer => "WRONG_ANSWER",
            GradeStatus::SyntaxError => "SYNTAX_ERROR",
            GradeStatus::LogicError => "LOGIC_ERROR",
            GradeStatus::RuntimeError => "RUNTIME_ERROR",
        }
    }

    /// Parses a status string, mapping anything outside the five-value enum
    /// to `WrongAnswer`.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "ACCEPTED" => GradeStatus::Accepted,
            "WRONG_ANSWER" => GradeStatus::WrongAnswer,
            "SYNTAX_ERROR" => GradeStatus::SyntaxError,
            "LOGIC_ERROR" => GradeStatus::LogicError,
            "RUNTIME_ERROR" => GradeStatus::RuntimeError,
            _ => GradeStatus::WrongAnswer,
        }
    }
}

impl fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of grading a code submission.
///
/// Invariants, enforced by [`GradeResult::new`]:
/// - `is_correct == true` implies `status == Accepted`
/// - `hint` is `None` whenever `is_correct == true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Judge-style classification.
    pub status: GradeStatus,
    /// Whether the submission is considered correct.
    pub is_correct: bool,
    /// Detailed feedback in English.
    pub feedback_en: String,
    /// Detailed feedback in Arabic.
    pub feedback_ar: String,
    /// Short hint for the learner; absent when the submission is correct.
    pub hint: Option<String>,
}

impl GradeResult {
    /// Creates a grade result, normalizing the fields so the invariants hold.
    pub fn new(
        status: GradeStatus,
        is_correct: bool,
        feedback_en: impl Into<String>,
        feedback_ar: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        let is_correct = is_correct && status == GradeStatus::Accepted;
        Self {
            status,
            is_correct,
            feedback_en: feedback_en.into(),
            feedback_ar: feedback_ar.into(),
            hint: if is_correct { None } else { hint },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&GradeStatus::Accepted).unwrap(), "\"ACCEPTED\"");
        assert_eq!(serde_json::to_string(&GradeStatus::WrongAnswer).unwrap(), "\"WRONG_ANSWER\"");
        assert_eq!(serde_json::to_string(&GradeStatus::RuntimeError).unwrap(), "\"RUNTIME_ERROR\"");
    }

    #[test]
    fn parse_lenient_maps_unknown_to_wrong_answer() {
        assert_eq!(GradeStatus::parse_lenient("ACCEPTED"), GradeStatus::Accepted);
        assert_eq!(GradeStatus::parse_lenient("COMPILE_ERROR"), GradeStatus::WrongAnswer);
        assert_eq!(GradeStatus::parse_lenient(""), GradeStatus::WrongAnswer);
        assert_eq!(GradeStatus::parse_lenient("accepted"), GradeStatus::WrongAnswer);
    }

    #[test]
    fn new_forces_correct_only_when_accepted() {
        let result = GradeResult::new(GradeStatus::LogicError, true, "en", "ar", None);
        assert!(!result.is_correct);
        assert_eq!(result.status, GradeStatus::LogicError);
    }

    #[test]
    fn new_drops_hint_on_correct_result() {
        let result = GradeResult::new(
            GradeStatus::Accepted,
            true,
            "Correct!",
            "صحيح!",
            Some("unused hint".to_string()),
        );
        assert!(result.is_correct);
        assert_eq!(result.hint, None);
    }

    #[test]
    fn new_keeps_hint_on_incorrect_result() {
        let result = GradeResult::new(
            GradeStatus::WrongAnswer,
            false,
            "en",
            "ar",
            Some("check your loop bounds".to_string()),
        );
        assert_eq!(result.hint.as_deref(), Some("check your loop bounds"));
    }
}
