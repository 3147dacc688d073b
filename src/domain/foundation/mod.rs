//! Foundation types shared across the domain.
//!
//! Small value objects (identifiers) and the validation error type used to
//! reject malformed caller input before any AI call is attempted.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::UserId;
