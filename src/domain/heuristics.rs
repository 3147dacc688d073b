//! Deterministic offline grading.
//!
//! When the AI capability is unavailable or returns unusable output, grading
//! falls back to a small set of static code checks so the learner always
//! gets a structurally valid result. The checks are deliberately generous:
//! code that passes them is ACCEPTED with a disclaimer that review happened
//! offline.

use once_cell::sync::Lazy;

use super::grade::{GradeResult, GradeStatus};

/// A phrase-category rule: when the problem description mentions one of the
/// phrases, the code must contain one of the patterns.
struct KeywordRule {
    phrases: &'static [&'static str],
    patterns: &'static [&'static str],
    feedback_en: &'static str,
    feedback_ar: &'static str,
    hint: &'static str,
}

static RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule {
            phrases: &["sum", "total", "average"],
            patterns: &["+", "sum"],
            feedback_en: "The problem asks for a sum, but your code never accumulates anything.",
            feedback_ar: "المسألة تطلب حساب مجموع، لكن الكود لا يجمع أي قيم.",
            hint: "Use a variable to accumulate values, e.g. total += x;",
        },
        KeywordRule {
            phrases: &["max", "largest", "biggest", "minimum", "smallest"],
            patterns: &[">", "<", "max(", "min("],
            feedback_en: "The problem asks for an extreme value, but your code never compares anything.",
            feedback_ar: "المسألة تطلب إيجاد قيمة قصوى، لكن الكود لا يقارن أي قيم.",
            hint: "Compare each value against the best one seen so far.",
        },
        KeywordRule {
            phrases: &["hello", "greeting"],
            patterns: &["Hello"],
            feedback_en: "Your code does not produce the expected output. Check your cout statement.",
            feedback_ar: "الكود لا ينتج المخرجات المطلوبة. تأكد من جملة cout الخاصة بك.",
            hint: "Make sure you print the text exactly as required, inside quotation marks.",
        },
    ]
});

/// Deterministic fallback grader.
///
/// Never fails and carries no hidden state: the same code and problem
/// description always produce the same [`GradeResult`].
pub struct HeuristicGrader;

impl HeuristicGrader {
    /// Grades `code` against `problem_description` with static checks only.
    pub fn grade(code: &str, problem_description: &str) -> GradeResult {
        if !has_entry_point(code) {
            return GradeResult::new(
                GradeStatus::WrongAnswer,
                false,
                "Your program is missing its entry point. Every C++ program needs an \
                 `int main()` function (or `setup()`/`loop()` for Arduino sketches).",
                "برنامجك يفتقد نقطة البداية. كل برنامج C++ يحتاج دالة `int main()` \
                 (أو `setup()`/`loop()` لمشاريع Arduino).",
                Some("Start from the template: #include <iostream> ... int main() { ... }".to_string()),
            );
        }

        if !produces_output(code) {
            return GradeResult::new(
                GradeStatus::WrongAnswer,
                false,
                "Your program never prints anything, so its answer can't be seen.",
                "برنامجك لا يطبع أي ناتج، لذا لا يمكن رؤية الإجابة.",
                Some("Print your result with cout << ...;".to_string()),
            );
        }

        let description = problem_description.to_lowercase();
        for rule in RULES.iter() {
            let mentioned = rule.phrases.iter().any(|p| description.contains(p));
            if mentioned && !rule.patterns.iter().any(|p| code.contains(p)) {
                return GradeResult::new(
                    GradeStatus::WrongAnswer,
                    false,
                    rule.feedback_en,
                    rule.feedback_ar,
                    Some(rule.hint.to_string()),
                );
            }
        }

        GradeResult::new(
            GradeStatus::Accepted,
            true,
            "Your code passed the basic offline checks. Note: the AI grader was \
             unavailable, so this review was heuristic and the solution was not fully evaluated.",
            "اجتاز الكود الفحوصات الأساسية. ملاحظة: المقيّم الذكي غير متاح حالياً، \
             لذا هذا تقييم مبدئي ولم يتم تقييم الحل بشكل كامل.",
            None,
        )
    }
}

fn has_entry_point(code: &str) -> bool {
    code.contains("int main") || (code.contains("void setup") && code.contains("void loop"))
}

fn produces_output(code: &str) -> bool {
    ["cout", "printf", "puts(", "Serial.print"]
        .iter()
        .any(|p| code.contains(p))
}
