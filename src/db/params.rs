//! Params module - conversion of JSON parameters to SQLite bind values.
//!
//! Parameters are matched to `?` placeholders strictly by position. Count
//! mismatches are not checked here; the bind/execute step reports them.

use rusqlite::ToSql;
use serde_json::Value;

/// Convert an ordered JSON parameter list to boxed SQLite bind values.
pub fn convert_params(params: &[Value]) -> Vec<Box<dyn ToSql + Send>> {
    params.iter().map(convert_single_param).collect()
}

/// Convert a single JSON value to a SQLite bind value.
///
/// Scalars map to the matching storage class; arrays and objects are bound
/// as their JSON text serialization.
pub fn convert_single_param(v: &Value) -> Box<dyn ToSql + Send> {
    match v {
        Value::Null => Box::new(rusqlite::types::Null) as Box<dyn ToSql + Send>,
        Value::Bool(b) => Box::new(*b) as Box<dyn ToSql + Send>,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Box::new(i) as Box<dyn ToSql + Send>
            } else {
                Box::new(n.as_f64().unwrap_or(0.0)) as Box<dyn ToSql + Send>
            }
        }
        Value::String(s) => Box::new(s.clone()) as Box<dyn ToSql + Send>,
        Value::Array(arr) => {
            Box::new(serde_json::to_string(arr).unwrap_or_default()) as Box<dyn ToSql + Send>
        }
        Value::Object(obj) => {
            Box::new(serde_json::to_string(obj).unwrap_or_default()) as Box<dyn ToSql + Send>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params_from_iter, Connection};
    use serde_json::json;

    fn storage_class_of(v: Value) -> String {
        let conn = Connection::open_in_memory().unwrap();
        let bind = convert_params(&[v]);
        let refs: Vec<&dyn ToSql> = bind.iter().map(|p| p as &dyn ToSql).collect();
        conn.query_row("SELECT typeof(?)", params_from_iter(refs), |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn scalars_map_to_storage_classes() {
        assert_eq!(storage_class_of(Value::Null), "null");
        assert_eq!(storage_class_of(json!(true)), "integer");
        assert_eq!(storage_class_of(json!(7)), "integer");
        assert_eq!(storage_class_of(json!(1.5)), "real");
        assert_eq!(storage_class_of(json!("hi")), "text");
    }

    #[test]
    fn compound_values_bind_as_json_text() {
        assert_eq!(storage_class_of(json!([1, 2])), "text");
        assert_eq!(storage_class_of(json!({"a": 1})), "text");
    }

    #[test]
    fn bound_text_round_trips() {
        let conn = Connection::open_in_memory().unwrap();
        let bind = convert_params(&[json!("ada")]);
        let refs: Vec<&dyn ToSql> = bind.iter().map(|p| p as &dyn ToSql).collect();
        let echoed: String = conn
            .query_row("SELECT ?", params_from_iter(refs), |row| row.get(0))
            .unwrap();
        assert_eq!(echoed, "ada");
    }
}
