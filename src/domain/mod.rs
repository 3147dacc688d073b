//! Domain types and pure logic.
//!
//! Everything here is synchronous and side-effect free: value objects,
//! prompt composition, the response contract, and the offline grading
//! heuristics. Async work (AI calls, history storage) lives behind the
//! ports and in the application layer.

pub mod chat;
pub mod contract;
pub mod foundation;
pub mod grade;
pub mod heuristics;
pub mod message;
pub mod problem;
pub mod prompt;
pub mod track;

pub use chat::ChatReply;
pub use foundation::{UserId, ValidationError};
pub use grade::{GradeResult, GradeStatus};
pub use message::{Message, MessageRole};
pub use problem::{Difficulty, Example, GeneratedProblem, Topic};
pub use track::Track;
