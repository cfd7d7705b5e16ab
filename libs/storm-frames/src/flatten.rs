//! Flattening of nested objects and the text encodings used for cells.

use serde_json::{Map, Value};

use crate::classify::is_integral;

/// Flattens nested objects into dot-joined keys.
///
/// Arrays become compact JSON text rather than new columns. When two paths
/// compose to the same key the later one in key order wins.
pub fn flatten(obj: &Map<String, Value>, prefix: &str) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(obj, prefix, &mut out);
    out
}

fn flatten_into(obj: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, value) in obj {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(inner, &key, out),
            Value::Array(_) => {
                out.insert(key, Value::String(compact(value)));
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                out.insert(key, value.clone());
            }
        }
    }
}

/// Canonical compact JSON text.
pub fn compact(value: &Value) -> String {
    value.to_string()
}

/// Text shown for a value in a string cell.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            match n.as_f64() {
                Some(v) if is_integral(v) && v.abs() < 1e21 => format!("{}", v as i64),
                Some(v) => v.to_string(),
                None => n.to_string(),
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => compact(value),
    }
}
