//! Prompt composition for the three AI task types.
//!
//! Pure, deterministic mapping from request context to a single prompt
//! string plus the response shape the capability is asked for. Composition
//! never performs I/O and never fails; the same inputs always produce the
//! same prompt, token for token.

use std::borrow::Cow;

use super::message::Message;
use super::problem::{Difficulty, Example, Topic};
use super::track::Track;

/// Character budget for the problem description in grading prompts.
pub const GRADING_DESC_CAP: usize = 1500;

/// Maximum sample I/O pairs included in a grading prompt.
pub const GRADING_SAMPLE_IO_CAP: usize = 3;

/// The response shape requested from the text-generation capability.
///
/// The contract layer still assumes nothing about output fidelity; this is
/// a request, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Free-form text (markdown allowed).
    FreeText,
    /// A single JSON object with a task-specific key set.
    StructuredJson,
}

/// A composed prompt ready to hand to the capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The full prompt text.
    pub text: String,
    /// Requested response shape.
    pub shape: ResponseShape,
}

/// Context for one chat turn.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    /// Recent conversation history, oldest first.
    pub history: Vec<Message>,
    /// Problem statement the learner is looking at, if any.
    pub problem_context: Option<String>,
    /// Code the learner is currently working on, if any.
    pub code_context: Option<String>,
    /// Selected hardware project (robotics track), if any.
    pub project_context: Option<String>,
}

impl ChatContext {
    /// Creates an empty context (single-turn guest chat).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the conversation history.
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Sets the problem context.
    pub fn with_problem_context(mut self, context: impl Into<String>) -> Self {
        self.problem_context = Some(context.into());
        self
    }

    /// Sets the code context.
    pub fn with_code_context(mut self, context: impl Into<String>) -> Self {
        self.code_context = Some(context.into());
        self
    }

    /// Sets the project context.
    pub fn with_project_context(mut self, context: impl Into<String>) -> Self {
        self.project_context = Some(context.into());
        self
    }
}

/// Inputs for a grading prompt.
#[derive(Debug, Clone)]
pub struct GradingContext {
    /// The submitted code.
    pub code: String,
    /// Problem statement the code is graded against.
    pub problem_description: String,
    /// Problem constraints, if any.
    pub constraints: Option<String>,
    /// Sample input/output pairs, if any.
    pub sample_io: Vec<Example>,
}

// ── Track-specific tutor personas ──────────────────────────────────

const PROBLEM_SOLVING_PERSONA: &str = "You are CodeBot, a friendly and encouraging C++ tutor for beginners. \
     You specialize in C++ logic, algorithms, data structures, and competitive programming (ACM/ICPC style). \
     Always answer in Arabic. Keep code snippets in English (C++). \
     Be encouraging, patient, and give clear step-by-step explanations.";

const ROBOTICS_PERSONA: &str = "You are RoboBot, a friendly and enthusiastic electronics and robotics tutor. \
     You specialize in Arduino, Tinkercad circuits, sensors, LEDs, motors, and hardware projects. \
     Always answer in Arabic. Keep code snippets (Arduino/C++) and component names in English. \
     Be encouraging, patient, and guide the student through wiring and code step-by-step. \
     When the student is working on a specific Tinkercad project, tailor your answers to that project.";

const CHAT_CONTRACT: &str = "You MUST respond strictly with a valid JSON object containing EXACTLY three keys:\n\
     - \"message_en\": The English version of your response.\n\
     - \"message_ar\": The Arabic version of your response.\n\
     - \"suggestions\": An array of maximum 3 short follow-up questions or suggestions for the user as strings.\n\
     No markdown fencing or other text outside the JSON.";

/// Returns the tutor persona for a track.
pub fn persona_for_track(track: Track) -> &'static str {
    match track {
        Track::ProblemSolving => PROBLEM_SOLVING_PERSONA,
        Track::Robotics => ROBOTICS_PERSONA,
    }
}

/// Composes a chat prompt.
///
/// The persona is selected by track; conversation history is replayed as
/// `role: content` lines so the tutor keeps continuity across turns.
/// Optional context blocks are appended as labeled sections only when
/// present.
pub fn compose_chat(track: Track, message: &str, context: &ChatContext) -> Prompt {
    let mut system = String::with_capacity(1024);
    system.push_str(persona_for_track(track));
    system.push_str("\n\n");
    system.push_str(CHAT_CONTRACT);

    if let Some(project) = &context.project_context {
        system.push_str(
            "\n\nThe student is currently working on the following project: ",
        );
        system.push_str(project);
        system.push_str(". Tailor your responses to help with this specific project.");
    }

    let mut text = String::with_capacity(system.len() + 512);
    text.push_str("System: ");
    text.push_str(&system);
    text.push('\n');

    for msg in &context.history {
        match msg.role {
            super::message::MessageRole::User => text.push_str("User: "),
            super::message::MessageRole::Assistant => text.push_str("Assistant: "),
        }
        text.push_str(&msg.content);
        text.push('\n');
    }

    text.push_str("User: ");
    text.push_str(message);

    if let Some(problem) = &context.problem_context {
        text.push_str("\nContext: ");
        text.push_str(problem);
        text.push('\n');
    }

    if let Some(code) = &context.code_context {
        text.push_str("\nCode: ");
        text.push_str(code);
        text.push('\n');
    }

    Prompt {
        text,
        shape: ResponseShape::StructuredJson,
    }
}

// ── Problem generation ─────────────────────────────────────────────

const GENERATION_PREAMBLE: &str = r#"You are a **Senior Competitive Programming Problem Setter** who writes problems strictly following the Codeforces / ACM-ICPC problem-setting conventions.

**Style requirements (follow rigorously):**
- Each problem MUST read like an official Codeforces round problem: a short narrative followed by a precise mathematical task statement.
- Input/output specifications must be exact: state the number of lines, the variables on each line, and their ranges using LaTeX math notation ($n$, $a_i$, $10^9$, etc.).
- Constraints must be tight and realistic for competitive programming (use powers of 10 as upper bounds).
- Include at least one non-trivial sample test case with a clear explanation.
- The problem must be algorithmically solvable — avoid ambiguous or open-ended tasks.

**Cultural flavour:**
The problems are for Jordanian university students, so use local names (Ayham, Qaruti, Hamza, Omar, Nooreldeen, Mohammad) and cultural references (Irbid, Amman, Shawarma, Mansaf, Falafel, Gaming Cafe, University Bus, Exam Night).

Below are 3 gold-standard reference problems. Study their structure, tone, input/output rigor, and LaTeX formatting, then generate a NEW problem that follows the exact same editorial pattern.

─── EXAMPLE 1 (Arrays & Floating Point) ───
{
  "title": "Big Chungus and Shawarmaji",
  "description": "Big Chungus is on a mission to rate all shawarma restaurants in Irbid because of his undying love for shawarma. He has rated $n$ restaurants, where the rating of the $i$-th restaurant is given as $a_i$. Help Big Chungus calculate the average rating of all the restaurants he has reviewed.",
  "input_format": "The first line contains a single integer $n$ ($2 \\le n \\le 10^6$) — the number of restaurants.\nThe second line contains $n$ integers $a_1, a_2, \\dots, a_n$ ($1 \\le a_i \\le 600$) — the ratings.",
  "output_format": "Print the average rating as a floating-point number with exactly 3 decimal places.",
  "examples": [
    {"input": "4\n10 20 30 40", "output": "25.000", "explanation": "The sum is 100, divided by 4 gives 25.000."}
  ],
  "constraints": "$2 \\le n \\le 10^6$, $1 \\le a_i \\le 600$"
}

─── EXAMPLE 2 (Math & Divisibility) ───
{
  "title": "Qaruti's Game",
  "description": "Qaruti and Omar are playing a game. Omar has a deck of $n$ cards, numbered from $1$ to $n$. In this game, Qaruti will take all the cards whose numbers are divisible by $k$. Your task is to determine how many cards Qaruti will take.",
  "input_format": "Two integers $n$ and $k$, where ($1 \\le k \\le n \\le 10^{18}$).",
  "output_format": "Print a single integer: the number of cards Qaruti will take.",
  "examples": [
    {"input": "25 7", "output": "3", "explanation": "The numbers divisible by 7 up to 25 are: 7, 14, 21. So the answer is 3."}
  ],
  "constraints": "$1 \\le k \\le n \\le 10^{18}$"
}

─── EXAMPLE 3 (Logic & Loop) ───
{
  "title": "Ayham's Reels",
  "description": "Ayham was watching Reels and found a puzzle: \"Given a number $x$, find 4 consecutive even numbers whose sum equals $x$.\"\nIf no such numbers exist, Ayham will be sad.",
  "input_format": "A single integer $x$ ($20 \\le x \\le 10^{12}$).",
  "output_format": "Print the 4 consecutive even numbers in ascending order.\nIf no solution exists, print \"-_-\".",
  "examples": [
    {"input": "20", "output": "2 4 6 8", "explanation": "2 + 4 + 6 + 8 = 20."},
    {"input": "30", "output": "-_-", "explanation": "No 4 consecutive even numbers sum to 30."}
  ],
  "constraints": "$20 \\le x \\le 10^{12}$"
}
"#;

/// Composes a problem-generation prompt.
///
/// Topic and difficulty are injected verbatim. The instruction forbids
/// markdown fencing; the contract layer still tolerates fenced replies.
pub fn compose_generation(topic: &Topic, difficulty: Difficulty) -> Prompt {
    let text = format!(
        "{GENERATION_PREAMBLE}\n\
         ═══════════════════════════════════════════\n\
         YOUR TASK: Generate ONE new problem with these constraints:\n\
         \u{2022} Topic: {topic}\n\
         \u{2022} Difficulty: {difficulty}\n\
         \u{2022} Pick a RANDOM creative theme from: Falafel Shop, University Bus, Gaming Cafe, Exam Night, \
         Mansaf Competition, Rooftop Study Session, Campus Parking, Late Night Coding, Library Queue, \
         Eid Shopping — or invent a new Jordanian-flavoured theme.\n\
         \u{2022} Use LaTeX-style formatting for ALL math variables and expressions: $n$, $A_i$, $10^9$, etc.\n\
         \u{2022} Story must be in English with local Jordanian cultural references.\n\
         \u{2022} The problem MUST be algorithmically solvable with correct, verifiable sample I/O — think like a \
         Codeforces problem-setter.\n\
         ═══════════════════════════════════════════\n\n\
         Respond with ONLY a single valid JSON object (no markdown fencing, no extra text). \
         The JSON must have exactly these keys:\n\
         \"title\", \"description\", \"input_format\", \"output_format\", \"examples\", \"constraints\"\n\
         where \"examples\" is an array of objects with \"input\", \"output\", \"explanation\". \
         An optional \"starter_code\" key may carry C++ scaffolding.",
        topic = topic.as_str(),
        difficulty = difficulty.as_str(),
    );

    Prompt {
        text,
        shape: ResponseShape::StructuredJson,
    }
}

// ── Grading ────────────────────────────────────────────────────────

/// Composes a grading prompt.
///
/// The problem description is truncated at [`GRADING_DESC_CAP`] characters
/// (with an ellipsis marker) and at most [`GRADING_SAMPLE_IO_CAP`] sample
/// pairs are included, to bound prompt cost.
pub fn compose_grading(context: &GradingContext) -> Prompt {
    let description = truncate_chars(&context.problem_description, GRADING_DESC_CAP);
    let sample_io = &context.sample_io[..context.sample_io.len().min(GRADING_SAMPLE_IO_CAP)];

    let mut sample_text = String::new();
    if sample_io.is_empty() {
        sample_text.push_str("N/A");
    } else {
        for (i, example) in sample_io.iter().enumerate() {
            if i > 0 {
                sample_text.push('\n');
            }
            sample_text.push_str("Input: ");
            sample_text.push_str(&example.input);
            sample_text.push_str("\nOutput: ");
            sample_text.push_str(&example.output);
        }
    }

    let text = format!(
        "You are an expert code grader for a C++ / Robotics educational platform.\n\
         Evaluate the following code against the problem description.\n\n\
         ### Problem Description\n{description}\n\n\
         ### Constraints\n{constraints}\n\n\
         ### Sample Input/Output\n{sample_text}\n\n\
         ### Student Code\n```\n{code}\n```\n\n\
         Respond with ONLY strict JSON (no markdown, no extra text). \
         The JSON must contain exactly these keys:\n\
         - \"status\": one of \"ACCEPTED\", \"WRONG_ANSWER\", \"SYNTAX_ERROR\", \"LOGIC_ERROR\", \"RUNTIME_ERROR\"\n\
         - \"is_correct\": boolean\n\
         - \"feedback_en\": string with detailed feedback in English\n\
         - \"feedback_ar\": string with detailed feedback in Arabic\n\
         - \"hint\": string with a short hint for the student (or null if correct)\n",
        description = description,
        constraints = context.constraints.as_deref().unwrap_or("N/A"),
        sample_text = sample_text,
        code = context.code,
    );

    Prompt {
        text,
        shape: ResponseShape::StructuredJson,
    }
}

// ── Solution review ────────────────────────────────────────────────

/// Composes a free-text code-review prompt.
pub fn compose_review(problem_context: &str, code: &str) -> Prompt {
    let text = format!(
        "You are a Code Reviewer.\n\
         Problem Context: {problem_context}\n\
         User Code:\n{code}\n\
         Provide feedback on correctness, complexity, and bugs. \
         Return the response as a Markdown string.",
    );

    Prompt {
        text,
        shape: ResponseShape::FreeText,
    }
}

/// Truncates `s` to at most `cap` characters, appending an ellipsis marker
/// when anything was cut.
fn truncate_chars(s: &str, cap: usize) -> Cow<'_, str> {
    match s.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = s[..byte_idx].to_string();
            out.push_str("...");
            Cow::Owned(out)
        }
        None => Cow::Borrowed(s),
    }
}
