//! One-shot prepare/bind/execute convenience layer over SQLite.
//!
//! The centerpiece is [`Database::execute_query`]: compile a `?`-placeholder
//! template, bind positional parameters, run the statement once, and hand
//! back either a buffered [`ResultSet`] or the row-less/failed marker
//! [`QueryOutcome::NoRowsOrError`]. How failures surface is controlled by
//! the connection's [`ReportMode`]; connection-level accessors
//! ([`Database::last_error`], [`Database::changes`],
//! [`Database::last_insert_rowid`]) carry the diagnostics the one-shot call
//! deliberately leaves out of its return value.

pub mod db;
pub mod error;
mod models;

pub use db::{Database, QueryOutcome, ReportMode, ResultSet, Row, Statement};
pub use error::{Error, Result};
pub use models::{ExecSummary, LastError};

/// Version of the bundled SQLite library.
pub fn sqlite_version() -> String {
    rusqlite::version().to_string()
}
