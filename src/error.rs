//! Error types for the one-shot query layer.

use crate::models::LastError;
use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Opening or configuring the underlying connection failed.
    #[error("open error: {0}")]
    Open(rusqlite::Error),

    /// The query template could not be compiled.
    #[error("prepare error: {0}")]
    Prepare(rusqlite::Error),

    /// Binding parameters or stepping the statement failed.
    #[error("execute error: {0}")]
    Execute(rusqlite::Error),

    /// The query template is empty or whitespace-only.
    #[error("query template is empty")]
    EmptyQuery,

    /// The connection mutex was poisoned by a panicking thread.
    #[error("database lock poisoned")]
    Lock,
}

impl Error {
    /// Connection-level detail recorded by `Database::execute_query`.
    pub(crate) fn detail(&self) -> LastError {
        match self {
            Error::Open(e) | Error::Prepare(e) | Error::Execute(e) => LastError {
                code: sqlite_code(e),
                message: e.to_string(),
            },
            other => LastError {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// Extended result code of a SQLite failure, when one is attached.
fn sqlite_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.extended_code),
        _ => None,
    }
}
