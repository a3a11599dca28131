//! Attendance ledger: append-only `(username, meeting)` check-ins.

pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;
