//! Attachment ledger: files in the upload folder linked to a meeting.

pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;
