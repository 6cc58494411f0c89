//! Database module - the connection handle and the one-shot query path.

use crate::db::params::convert_params;
use crate::db::rows::{materialize_row, QueryOutcome, ResultSet, Row};
use crate::db::Statement;
use crate::error::{Error, Result};
use crate::models::{ExecSummary, LastError};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// How prepare/execute failures surface from the one-shot path.
///
/// Selected on the connection, not per call; the one-shot executor only
/// consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Failures return `Err` from the call.
    #[default]
    Strict,
    /// Failures are recorded in `last_error` and the call returns
    /// `QueryOutcome::NoRowsOrError`.
    Silent,
}

struct State {
    report_mode: ReportMode,
    last_error: Option<LastError>,
}

/// An open SQLite session.
///
/// Cloning the handle shares the underlying connection. SQLite runs one
/// statement at a time, so calls serialize on an internal lock.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    state: Arc<Mutex<State>>,
}

impl Database {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::Open)?;
        Self::from_conn(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Open)?;
        Self::from_conn(conn)
    }

    fn from_conn(conn: Connection) -> Result<Self> {
        // Extended result codes give last_error the precise failure class
        conn.execute_batch("PRAGMA extended_result_codes = ON")
            .map_err(Error::Open)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(Error::Open)?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
            state: Arc::new(Mutex::new(State {
                report_mode: ReportMode::default(),
                last_error: None,
            })),
        })
    }

    // The state mutex only guards plain data, so a poisoned guard is still
    // coherent and can be recovered.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Select how one-shot failures surface on this connection.
    pub fn set_report_mode(&self, mode: ReportMode) {
        self.state().report_mode = mode;
    }

    pub fn report_mode(&self) -> ReportMode {
        self.state().report_mode
    }

    /// Detail of the most recent failed one-shot query, cleared by the next
    /// successful one. Under `ReportMode::Silent` this is the only way to
    /// tell a swallowed failure apart from a successful row-less statement.
    pub fn last_error(&self) -> Option<LastError> {
        self.state().last_error.clone()
    }

    /// Run `sql` once: fresh prepare, positional bind, execute, buffer.
    ///
    /// Row-producing statements yield [`QueryOutcome::Rows`] even when zero
    /// rows matched; statements with no result columns yield
    /// [`QueryOutcome::NoRowsOrError`]. Prepare/execute failures follow the
    /// connection's [`ReportMode`]: under `Strict` they return `Err`, under
    /// `Silent` they are recorded in [`last_error`](Self::last_error) and
    /// the call returns `Ok(QueryOutcome::NoRowsOrError)`.
    ///
    /// The prepared statement is discarded when the call returns; a second
    /// call with the same template performs a fresh prepare.
    pub fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryOutcome> {
        match self.execute_query_inner(sql, params) {
            Ok(outcome) => {
                self.state().last_error = None;
                Ok(outcome)
            }
            // Lock poisoning is a process-level fault, not a statement
            // failure; it never turns into the sentinel.
            Err(err @ Error::Lock) => Err(err),
            Err(err) => {
                let detail = err.detail();
                warn!(message = %detail.message, "one-shot query failed");
                let mode = {
                    let mut state = self.state();
                    state.last_error = Some(detail);
                    state.report_mode
                };
                match mode {
                    ReportMode::Strict => Err(err),
                    ReportMode::Silent => Ok(QueryOutcome::NoRowsOrError),
                }
            }
        }
    }

    fn execute_query_inner(&self, sql: &str, params: &[Value]) -> Result<QueryOutcome> {
        if sql.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;

        debug!(sql, n_params = params.len(), "prepare");
        let mut stmt = conn.prepare(sql).map_err(Error::Prepare)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let bind_values = convert_params(params);
        let bind_refs: Vec<&dyn ToSql> = bind_values.iter().map(|p| p as &dyn ToSql).collect();

        let mut rows = stmt.query(params_from_iter(bind_refs)).map_err(Error::Execute)?;

        // Stepping to completion both runs the statement and buffers any
        // output; a statement with no result columns never yields a row.
        let mut buffered: Vec<Row> = Vec::new();
        while let Some(row) = rows.next().map_err(Error::Execute)? {
            buffered.push(materialize_row(row, &columns));
        }
        debug!(n_rows = buffered.len(), n_columns = columns.len(), "done");

        if columns.is_empty() {
            Ok(QueryOutcome::NoRowsOrError)
        } else {
            Ok(QueryOutcome::Rows(ResultSet::from_parts(columns, buffered)))
        }
    }

    /// Validate `sql` and hand back the manual prepared-statement path.
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        if sql.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        {
            let conn = self.conn.lock().map_err(|_| Error::Lock)?;
            conn.prepare(sql).map_err(Error::Prepare)?;
        }
        Ok(Statement::new(sql.to_string(), self.conn.clone()))
    }

    /// Execute a single data-modifying statement and report its summary.
    pub fn run(&self, sql: &str, params: &[Value]) -> Result<ExecSummary> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;

        let bind_values = convert_params(params);
        let bind_refs: Vec<&dyn ToSql> = bind_values.iter().map(|p| p as &dyn ToSql).collect();

        let changes = conn
            .execute(sql, bind_refs.as_slice())
            .map_err(Error::Execute)?;

        Ok(ExecSummary {
            changes: changes as u64,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }

    /// Run a batch of semicolon-separated statements with no parameters.
    pub fn exec(&self, sql: &str) -> Result<ExecSummary> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        conn.execute_batch(sql).map_err(Error::Execute)?;
        Ok(ExecSummary {
            changes: conn.changes(),
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }

    /// Rows changed by the most recent data-modifying statement.
    ///
    /// SQLite leaves this untouched by row-producing statements, so after a
    /// one-shot SELECT it still reflects the previous write.
    pub fn changes(&self) -> Result<u64> {
        Ok(self.conn.lock().map_err(|_| Error::Lock)?.changes())
    }

    /// Rowid generated by the most recent successful INSERT.
    pub fn last_insert_rowid(&self) -> Result<i64> {
        Ok(self.conn.lock().map_err(|_| Error::Lock)?.last_insert_rowid())
    }

    /// Names of all user tables, sorted.
    pub fn tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(Error::Prepare)?;

        let tables = stmt
            .query_map([], |row| row.get(0))
            .map_err(Error::Execute)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(Error::Execute)?;

        Ok(tables)
    }

    /// Check if a user table exists.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                [name],
                |row| row.get(0),
            )
            .map_err(Error::Execute)?;
        Ok(count > 0)
    }
}
