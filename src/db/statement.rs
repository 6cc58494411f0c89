//! Statement module - the manual prepared-statement path.

use crate::db::params::convert_params;
use crate::db::rows::{materialize_row, ResultSet, Row};
use crate::error::{Error, Result};
use crate::models::ExecSummary;
use rusqlite::{params_from_iter, Connection, ToSql};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// A query template held against a live connection.
///
/// Every call compiles the template anew; nothing is cached between calls.
/// This is the prepare/bind/execute/materialize sequence that
/// [`Database::execute_query`](crate::Database::execute_query) wraps into a
/// single step.
pub struct Statement {
    sql: String,
    conn: Arc<Mutex<Connection>>,
}

impl Statement {
    pub(crate) fn new(sql: String, conn: Arc<Mutex<Connection>>) -> Self {
        Statement { sql, conn }
    }

    /// The stored query template.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute and buffer every row as a column-keyed object.
    pub fn query_all(&self, params: &[Value]) -> Result<ResultSet> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        let mut stmt = conn.prepare(&self.sql).map_err(Error::Prepare)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let bind_values = convert_params(params);
        let bind_refs: Vec<&dyn ToSql> = bind_values.iter().map(|p| p as &dyn ToSql).collect();

        let mut rows = stmt.query(params_from_iter(bind_refs)).map_err(Error::Execute)?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next().map_err(Error::Execute)? {
            buffered.push(materialize_row(row, &columns));
        }
        Ok(ResultSet::from_parts(columns, buffered))
    }

    /// Execute and return the first row, if any.
    pub fn query_row(&self, params: &[Value]) -> Result<Option<Row>> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        let mut stmt = conn.prepare(&self.sql).map_err(Error::Prepare)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let bind_values = convert_params(params);
        let bind_refs: Vec<&dyn ToSql> = bind_values.iter().map(|p| p as &dyn ToSql).collect();

        let mut rows = stmt.query(params_from_iter(bind_refs)).map_err(Error::Execute)?;
        match rows.next().map_err(Error::Execute)? {
            Some(row) => Ok(Some(materialize_row(row, &columns))),
            None => Ok(None),
        }
    }

    /// Execute a data-modifying statement and report its summary.
    pub fn execute(&self, params: &[Value]) -> Result<ExecSummary> {
        let conn = self.conn.lock().map_err(|_| Error::Lock)?;
        let mut stmt = conn.prepare(&self.sql).map_err(Error::Prepare)?;

        let bind_values = convert_params(params);
        let bind_refs: Vec<&dyn ToSql> = bind_values.iter().map(|p| p as &dyn ToSql).collect();

        let changes = stmt
            .execute(params_from_iter(bind_refs))
            .map_err(Error::Execute)?;

        Ok(ExecSummary {
            changes: changes as u64,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }
}
