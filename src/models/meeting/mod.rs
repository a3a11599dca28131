//! Meeting lifecycle manager.
//!
//! Owns the `not started -> active -> ended` state machine and the join code
//! that gates check-in while a meeting is active. Every transition is a
//! single conditional write against the database, so two concurrent callers
//! can never both succeed.

pub mod code;
pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;
