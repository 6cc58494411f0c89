use serde::{Deserialize, Serialize};

/// Outcome metadata of a data-modifying statement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecSummary {
    pub changes: u64,
    pub last_insert_rowid: i64,
}

/// Code and message of the most recent failed one-shot query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    /// SQLite extended result code, when the failure carries one.
    pub code: Option<i32>,
    pub message: String,
}
