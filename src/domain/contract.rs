//! Response contract: turning raw model output into schema-valid results.
//!
//! The capability returns free-form text that was *asked* to be a bare JSON
//! object. This module repairs common formatting violations (markdown code
//! fences), decodes strictly, and — for the grading and chat contracts —
//! backfills missing required keys with named safe defaults so those
//! operations still succeed. Backfilled keys are reported to the caller for
//! diagnostics.

use serde::Deserialize;
use thiserror::Error;

use super::chat::ChatReply;
use super::grade::{GradeResult, GradeStatus};
use super::problem::{Example, GeneratedProblem};

/// Maximum follow-up suggestions kept in a chat reply.
pub const MAX_SUGGESTIONS: usize = 3;

/// Maximum worked examples kept in a generated problem.
pub const MAX_EXAMPLES: usize = 5;

/// Grading feedback used when the model omitted the field.
pub const GRADE_FALLBACK_FEEDBACK_EN: &str = "Could not fully evaluate the code.";
/// Arabic counterpart of [`GRADE_FALLBACK_FEEDBACK_EN`].
pub const GRADE_FALLBACK_FEEDBACK_AR: &str = "تعذّر تقييم الكود بشكل كامل.";

/// Chat message used when the model omitted the field.
pub const CHAT_FALLBACK_MESSAGE_EN: &str = "I'm sorry, I couldn't format my response properly.";
/// Arabic counterpart of [`CHAT_FALLBACK_MESSAGE_EN`].
pub const CHAT_FALLBACK_MESSAGE_AR: &str = "عذراً، لم أتمكن من تنسيق الرد بشكل صحيح.";

/// Raw model output that could not be repaired into the requested schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ContractError {
    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// A decoded value plus the required keys that had to be backfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The schema-valid value.
    pub value: T,
    /// Required keys the model omitted, filled with safe defaults.
    pub backfilled: Vec<&'static str>,
}

impl<T> Decoded<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            backfilled: Vec::new(),
        }
    }
}

/// Strips markdown code-fence wrapping from raw model output.
///
/// Removes a leading fence marker (with or without a language tag) and a
/// matching trailing marker, repeatedly until a fixpoint, so the operation
/// is idempotent: `repair(repair(s)) == repair(s)`. Text without fences is
/// returned trimmed but otherwise untouched; backticks *inside* the body
/// are preserved.
pub fn repair(raw: &str) -> &str {
    let mut current = raw.trim();
    loop {
        let next = strip_fence_once(current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fence_once(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // The opening marker line may carry a language tag ("```json").
    let Some(newline) = rest.find('\n') else {
        return s;
    };
    let body = rest[newline + 1..].trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

// ── Grading contract ───────────────────────────────────────────────

/// Decodes a grading reply into a [`GradeResult`].
///
/// Missing required keys are backfilled (status → WRONG_ANSWER,
/// is_correct → false, feedback → fixed apologetic strings, hint → absent)
/// and the decode still succeeds. A reply that is not a JSON object at all
/// is a [`ContractError::Malformed`].
pub fn decode_grade(raw: &str) -> Result<Decoded<GradeResult>, ContractError> {
    let raw_grade: RawGrade =
        serde_json::from_str(repair(raw)).map_err(|e| ContractError::malformed(e.to_string()))?;

    let mut backfilled = Vec::new();

    let status = match raw_grade.status {
        Some(s) => GradeStatus::parse_lenient(&s),
        None => {
            backfilled.push("status");
            GradeStatus::WrongAnswer
        }
    };
    let is_correct = raw_grade.is_correct.unwrap_or_else(|| {
        backfilled.push("is_correct");
        false
    });
    let feedback_en = raw_grade.feedback_en.unwrap_or_else(|| {
        backfilled.push("feedback_en");
        GRADE_FALLBACK_FEEDBACK_EN.to_string()
    });
    let feedback_ar = raw_grade.feedback_ar.unwrap_or_else(|| {
        backfilled.push("feedback_ar");
        GRADE_FALLBACK_FEEDBACK_AR.to_string()
    });
    let hint = match raw_grade.hint {
        Some(hint) => hint,
        None => {
            backfilled.push("hint");
            None
        }
    };

    Ok(Decoded {
        value: GradeResult::new(status, is_correct, feedback_en, feedback_ar, hint),
        backfilled,
    })
}

// ── Chat contract ──────────────────────────────────────────────────

/// Decodes a chat reply into a [`ChatReply`].
///
/// Missing keys are backfilled (messages → fixed apologetic strings,
/// suggestions → empty). Suggestions beyond [`MAX_SUGGESTIONS`] are
/// truncated silently.
pub fn decode_chat(raw: &str) -> Result<Decoded<ChatReply>, ContractError> {
    let raw_chat: RawChat =
        serde_json::from_str(repair(raw)).map_err(|e| ContractError::malformed(e.to_string()))?;

    let mut backfilled = Vec::new();

    let message = raw_chat.message_en.unwrap_or_else(|| {
        backfilled.push("message_en");
        CHAT_FALLBACK_MESSAGE_EN.to_string()
    });
    let message_ar = raw_chat.message_ar.unwrap_or_else(|| {
        backfilled.push("message_ar");
        CHAT_FALLBACK_MESSAGE_AR.to_string()
    });
    let mut suggestions = raw_chat.suggestions.unwrap_or_else(|| {
        backfilled.push("suggestions");
        Vec::new()
    });
    suggestions.truncate(MAX_SUGGESTIONS);

    Ok(Decoded {
        value: ChatReply::new(message, message_ar, suggestions),
        backfilled,
    })
}

// ── Generation contract ────────────────────────────────────────────

/// Decodes a generated problem.
///
/// Generation is strict: there is no backfill, and every required key must
/// be present (`starter_code` is the one optional key). Examples beyond
/// [`MAX_EXAMPLES`] are truncated silently; an empty example list fails the
/// schema.
pub fn decode_problem(raw: &str) -> Result<Decoded<GeneratedProblem>, ContractError> {
    let raw_problem: RawProblem =
        serde_json::from_str(repair(raw)).map_err(|e| ContractError::malformed(e.to_string()))?;

    let missing: Vec<&str> = [
        ("title", raw_problem.title.is_none()),
        ("description", raw_problem.description.is_none()),
        ("input_format", raw_problem.input_format.is_none()),
        ("output_format", raw_problem.output_format.is_none()),
        ("examples", raw_problem.examples.is_none()),
        ("constraints", raw_problem.constraints.is_none()),
    ]
    .into_iter()
    .filter_map(|(key, absent)| absent.then_some(key))
    .collect();

    if !missing.is_empty() {
        return Err(ContractError::malformed(format!(
            "missing required keys: {}",
            missing.join(", ")
        )));
    }

    let mut examples = raw_problem.examples.unwrap_or_default();
    if examples.is_empty() {
        return Err(ContractError::malformed("examples must not be empty"));
    }
    examples.truncate(MAX_EXAMPLES);

    Ok(Decoded::clean(GeneratedProblem {
        title: raw_problem.title.unwrap_or_default(),
        description: raw_problem.description.unwrap_or_default(),
        input_format: raw_problem.input_format.unwrap_or_default(),
        output_format: raw_problem.output_format.unwrap_or_default(),
        examples,
        constraints: raw_problem.constraints.unwrap_or_default(),
        starter_code: raw_problem.starter_code.unwrap_or_default(),
    }))
}

// ── Raw wire shapes ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawGrade {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    feedback_en: Option<String>,
    #[serde(default)]
    feedback_ar: Option<String>,
    /// Absent (outer `None`) is distinct from an explicit `null`
    /// (`Some(None)`).
    #[serde(default, deserialize_with = "double_option")]
    hint: Option<Option<String>>,
}

/// Keeps the outer `Option` as presence: a present key always deserializes
/// to `Some`, so an explicit `null` becomes `Some(None)` instead of `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct RawChat {
    #[serde(default)]
    message_en: Option<String>,
    #[serde(default)]
    message_ar: Option<String>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_format: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    examples: Option<Vec<Example>>,
    #[serde(default)]
    constraints: Option<String>,
    #[serde(default)]
    starter_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── repair ──

    #[test]
    fn repair_leaves_plain_text_untouched() {
        assert_eq!(repair("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(repair("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn repair_strips_fence_without_language_tag() {
        assert_eq!(repair("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn repair_strips_fence_with_language_tag() {
        assert_eq!(repair("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn repair_strips_opening_fence_only() {
        assert_eq!(repair("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn repair_preserves_nested_backticks() {
        let raw = "```\n{\"msg\": \"use ```cpp``` blocks\"}\n```";
        assert_eq!(repair(raw), "{\"msg\": \"use ```cpp``` blocks\"}");
    }

    #[test]
    fn repair_handles_doubly_fenced_output() {
        let raw = "```\n```json\n{\"a\": 1}\n```\n```";
        assert_eq!(repair(raw), "{\"a\": 1}");
    }

    #[test]
    fn repair_is_idempotent() {
        for raw in [
            "plain",
            "```json\n{}\n```",
            "```\ntext",
            "``` incomplete",
            "",
            "```\n```",
        ] {
            let once = repair(raw);
            assert_eq!(repair(once), once, "not idempotent for {raw:?}");
        }
    }

    proptest! {
        #[test]
        fn repair_is_idempotent_for_arbitrary_input(raw in ".{0,200}") {
            let once = repair(&raw).to_string();
            prop_assert_eq!(repair(&once), once.as_str());
        }

        #[test]
        fn grade_decode_upholds_schema_invariant(raw in ".{0,200}") {
            // Whatever comes back, a successful decode satisfies the
            // GradeResult invariants.
            if let Ok(decoded) = decode_grade(&raw) {
                if decoded.value.is_correct {
                    prop_assert_eq!(decoded.value.status, GradeStatus::Accepted);
                    prop_assert!(decoded.value.hint.is_none());
                }
            }
        }
    }

    // ── grading ──

    #[test]
    fn decode_grade_accepts_complete_reply() {
        let raw = r#"{"status":"ACCEPTED","is_correct":true,"feedback_en":"Nice","feedback_ar":"ممتاز","hint":null}"#;
        let decoded = decode_grade(raw).unwrap();

        assert!(decoded.backfilled.is_empty());
        assert_eq!(decoded.value.status, GradeStatus::Accepted);
        assert!(decoded.value.is_correct);
        assert_eq!(decoded.value.hint, None);
    }

    #[test]
    fn decode_grade_backfills_missing_keys() {
        let decoded = decode_grade("{}").unwrap();

        assert_eq!(
            decoded.backfilled,
            vec!["status", "is_correct", "feedback_en", "feedback_ar", "hint"]
        );
        assert_eq!(decoded.value.status, GradeStatus::WrongAnswer);
        assert!(!decoded.value.is_correct);
        assert_eq!(decoded.value.feedback_en, GRADE_FALLBACK_FEEDBACK_EN);
        assert_eq!(decoded.value.feedback_ar, GRADE_FALLBACK_FEEDBACK_AR);
    }

    #[test]
    fn decode_grade_normalizes_unknown_status() {
        let raw = r#"{"status":"COMPILE_ERROR","is_correct":false,"feedback_en":"e","feedback_ar":"a","hint":"h"}"#;
        let decoded = decode_grade(raw).unwrap();

        assert!(decoded.backfilled.is_empty());
        assert_eq!(decoded.value.status, GradeStatus::WrongAnswer);
    }

    #[test]
    fn decode_grade_explicit_null_hint_is_not_backfill() {
        let raw = r#"{"status":"ACCEPTED","is_correct":true,"feedback_en":"e","feedback_ar":"a","hint":null}"#;
        let decoded = decode_grade(raw).unwrap();
        assert!(decoded.backfilled.is_empty());
    }

    #[test]
    fn decode_grade_rejects_non_object() {
        assert!(decode_grade("not json at all").is_err());
        assert!(decode_grade("[1, 2, 3]").is_err());
    }

    #[test]
    fn decode_grade_tolerates_fenced_reply() {
        let raw = "```json\n{\"status\":\"LOGIC_ERROR\",\"is_correct\":false,\"feedback_en\":\"e\",\"feedback_ar\":\"a\",\"hint\":\"h\"}\n```";
        let decoded = decode_grade(raw).unwrap();
        assert_eq!(decoded.value.status, GradeStatus::LogicError);
    }

    // ── chat ──

    #[test]
    fn decode_chat_accepts_complete_reply() {
        let raw = r#"{"message_en":"Loops repeat work.","message_ar":"الحلقات تكرر العمل.","suggestions":["What is a for loop?"]}"#;
        let decoded = decode_chat(raw).unwrap();

        assert!(decoded.backfilled.is_empty());
        assert_eq!(decoded.value.message, "Loops repeat work.");
        assert_eq!(decoded.value.suggestions.len(), 1);
    }

    #[test]
    fn decode_chat_backfills_missing_suggestions() {
        let raw = r#"{"message_en":"Hi","message_ar":"أهلاً"}"#;
        let decoded = decode_chat(raw).unwrap();

        assert_eq!(decoded.backfilled, vec!["suggestions"]);
        assert!(decoded.value.suggestions.is_empty());
        assert_eq!(decoded.value.message, "Hi");
    }

    #[test]
    fn decode_chat_truncates_excess_suggestions() {
        let raw = r#"{"message_en":"m","message_ar":"m","suggestions":["a","b","c","d","e"]}"#;
        let decoded = decode_chat(raw).unwrap();
        assert_eq!(decoded.value.suggestions, vec!["a", "b", "c"]);
    }

    #[test]
    fn decode_chat_rejects_garbage() {
        assert!(decode_chat("<html>rate limited</html>").is_err());
    }

    // ── generation ──

    fn problem_json() -> serde_json::Value {
        serde_json::json!({
            "title": "Qaruti's Queue",
            "description": "Count the people ahead of Qaruti, $n$ in total.",
            "input_format": "A single integer $n$.",
            "output_format": "One integer.",
            "examples": [{"input": "3", "output": "3", "explanation": "Three ahead."}],
            "constraints": "$1 \\le n \\le 10^9$"
        })
    }

    #[test]
    fn decode_problem_accepts_complete_reply() {
        let decoded = decode_problem(&problem_json().to_string()).unwrap();
        assert_eq!(decoded.value.title, "Qaruti's Queue");
        assert_eq!(decoded.value.examples.len(), 1);
        assert_eq!(decoded.value.starter_code, "");
    }

    #[test]
    fn decode_problem_rejects_missing_keys() {
        let mut json = problem_json();
        json.as_object_mut().unwrap().remove("output_format");
        let err = decode_problem(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("output_format"));
    }

    #[test]
    fn decode_problem_rejects_empty_examples() {
        let mut json = problem_json();
        json["examples"] = serde_json::json!([]);
        assert!(decode_problem(&json.to_string()).is_err());
    }

    #[test]
    fn decode_problem_caps_examples() {
        let mut json = problem_json();
        let example = json["examples"][0].clone();
        json["examples"] = serde_json::Value::Array(vec![example; MAX_EXAMPLES + 2]);
        let decoded = decode_problem(&json.to_string()).unwrap();
        assert_eq!(decoded.value.examples.len(), MAX_EXAMPLES);
    }

    #[test]
    fn decode_problem_tolerates_fencing_violation() {
        let raw = format!("```json\n{}\n```", problem_json());
        assert!(decode_problem(&raw).is_ok());
    }
}
