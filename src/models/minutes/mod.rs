//! Minutes ledger: free-text notes per meeting with a contributor list.

pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;
