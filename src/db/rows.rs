//! Rows module - SQLite-to-JSON column conversion, buffered result sets,
//! and the tagged outcome of a one-shot query.

use serde_json::{Map, Number, Value};

/// A single materialized row, keyed by column name.
pub type Row = Map<String, Value>;

/// Fully buffered output of a row-producing statement.
///
/// Column order is the statement's; an empty set still carries the columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// What a one-shot query produced.
///
/// `NoRowsOrError` covers both a successful statement with no result columns
/// (INSERT/UPDATE/DELETE/DDL) and, under `ReportMode::Silent`, a failed
/// prepare or execute. The two are deliberately indistinguishable by the
/// return value; `Database::last_error` disambiguates.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(ResultSet),
    NoRowsOrError,
}

impl QueryOutcome {
    pub fn is_rows(&self) -> bool {
        matches!(self, QueryOutcome::Rows(_))
    }

    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            QueryOutcome::Rows(set) => Some(set),
            QueryOutcome::NoRowsOrError => None,
        }
    }

    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            QueryOutcome::Rows(set) => Some(set),
            QueryOutcome::NoRowsOrError => None,
        }
    }
}

/// Convert one SQLite column value to JSON with proper type handling.
pub fn sqlite_to_json(row: &rusqlite::Row, i: usize) -> Value {
    match row.get_ref(i) {
        Ok(rusqlite::types::ValueRef::Null) => Value::Null,
        Ok(rusqlite::types::ValueRef::Integer(v)) => Value::Number(v.into()),
        Ok(rusqlite::types::ValueRef::Real(f)) => {
            Value::Number(Number::from_f64(f).unwrap_or(Number::from(0)))
        }
        Ok(rusqlite::types::ValueRef::Text(t)) => {
            Value::String(String::from_utf8_lossy(t).into_owned())
        }
        Ok(rusqlite::types::ValueRef::Blob(b)) => Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        _ => Value::Null,
    }
}

/// Materialize the current row as a column-keyed object.
pub(crate) fn materialize_row(row: &rusqlite::Row, columns: &[String]) -> Row {
    let mut map = Map::new();
    for (i, name) in columns.iter().enumerate() {
        map.insert(name.clone(), sqlite_to_json(row, i));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn storage_classes_map_to_json() {
        let conn = Connection::open_in_memory().unwrap();
        conn.query_row("SELECT 1, 1.5, 'x', NULL, x'00ff'", [], |row| {
            assert_eq!(sqlite_to_json(row, 0), json!(1));
            assert_eq!(sqlite_to_json(row, 1), json!(1.5));
            assert_eq!(sqlite_to_json(row, 2), json!("x"));
            assert_eq!(sqlite_to_json(row, 3), Value::Null);
            assert_eq!(sqlite_to_json(row, 4), json!("AP8="));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn empty_result_set_keeps_columns() {
        let set = ResultSet::from_parts(vec!["a".into(), "b".into()], Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.columns(), ["a", "b"]);
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn outcome_accessors() {
        let set = ResultSet::from_parts(vec!["a".into()], Vec::new());
        let outcome = QueryOutcome::Rows(set.clone());
        assert!(outcome.is_rows());
        assert_eq!(outcome.rows(), Some(&set));
        assert_eq!(outcome.into_rows(), Some(set));
        assert_eq!(QueryOutcome::NoRowsOrError.into_rows(), None);
    }
}
