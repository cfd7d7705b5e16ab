//! Decoder for `/api/v1/storm/call`, which answers with one JSON document.
//!
//! The result can be any JSON value, so the table shape is picked from the
//! value itself: lists of objects become wide tables, packed nodes become
//! node tables, and everything else collapses into a single column.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::Error;
use crate::flatten::{compact, display, flatten};
use crate::node::{NodeRecord, is_node, node_table};
use crate::table::{Column, ColumnValues, NULL, Table, TimeReinterpret, build_column};
use crate::timestamp::normalize;

pub const TABLE_NAME: &str = "storm_call";

/// Strips the `{"status": "ok", "result": ...}` envelope.
///
/// `{"status": "err", ...}` is the remote reporting a failure. Documents
/// without an envelope are returned as they are.
pub fn unwrap_envelope(doc: Value) -> Result<Value, Error> {
    let Value::Object(mut obj) = doc else {
        return Ok(doc);
    };
    let status = obj.get("status").and_then(Value::as_str).map(str::to_string);
    match status.as_deref() {
        Some("ok") if obj.contains_key("result") => {
            Ok(obj.remove("result").unwrap_or(Value::Null))
        }
        Some("err") => {
            let code = obj.get("code").map(display).unwrap_or_default();
            let message = obj
                .get("mesg")
                .map(display)
                .unwrap_or_else(|| compact(&Value::Object(obj.clone())));
            Err(Error::remote(code, message))
        }
        _ => Ok(Value::Object(obj)),
    }
}

pub fn decode_body(body: &[u8], ref_id: &str, flatten: bool) -> Result<Table, Error> {
    let doc: Value = serde_json::from_slice(body)?;
    let result = unwrap_envelope(doc)?;
    Ok(decode(&result, ref_id, flatten))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Empty,
    ObjectList,
    NodeList,
    ListOfLists,
    PrimitiveList,
    KeyValue,
    Scalar,
}

impl Shape {
    pub fn of(result: &Value) -> Self {
        match result {
            Value::Array(items) => match items.first() {
                None => Shape::Empty,
                Some(Value::Object(_)) => Shape::ObjectList,
                Some(Value::Array(_)) if is_node(&items[0]) => Shape::NodeList,
                Some(Value::Array(_)) => Shape::ListOfLists,
                Some(_) => Shape::PrimitiveList,
            },
            Value::Object(_) => Shape::KeyValue,
            _ => Shape::Scalar,
        }
    }
}

pub fn decode(result: &Value, ref_id: &str, flatten: bool) -> Table {
    let shape = Shape::of(result);
    debug!(?shape, "decoding storm call result");
    let items = result.as_array().map(Vec::as_slice).unwrap_or_default();
    match (shape, result) {
        (Shape::Empty, _) => {
            let mut table = Table::new(TABLE_NAME, ref_id);
            table.push(Column::strings("result", Vec::<String>::new()));
            table
        }
        (Shape::ObjectList, _) => object_list(items, ref_id, flatten),
        (Shape::NodeList, _) => {
            let records: Vec<NodeRecord> = items.iter().filter_map(NodeRecord::parse).collect();
            node_table(TABLE_NAME, ref_id, &records, false)
        }
        (Shape::ListOfLists, _) => {
            let mut table = Table::new(TABLE_NAME, ref_id);
            table.push(Column::strings("value", items.iter().map(compact)));
            table
        }
        (Shape::PrimitiveList, _) => primitive_list(items, ref_id),
        (Shape::KeyValue, Value::Object(obj)) => key_value(obj, ref_id),
        _ => {
            let mut table = Table::new(TABLE_NAME, ref_id);
            table.push(Column::strings("result", [display(result)]));
            table
        }
    }
}

fn object_list(items: &[Value], ref_id: &str, flatten_rows: bool) -> Table {
    let rows: Vec<Map<String, Value>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            if flatten_rows {
                flatten(obj, "")
            } else {
                inline_nested(obj)
            }
        })
        .collect();
    let keys: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut table = Table::new(TABLE_NAME, ref_id);
    for key in keys {
        let cells: Vec<&Value> = rows.iter().map(|row| row.get(key).unwrap_or(&NULL)).collect();
        table.push(build_column(key, &cells, TimeReinterpret::Numeric));
    }
    table
}

/// Nested objects and arrays become compact JSON text; scalars keep their type.
fn inline_nested(obj: &Map<String, Value>) -> Map<String, Value> {
    obj.iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Object(_) | Value::Array(_) => Value::String(compact(v)),
                _ => v.clone(),
            };
            (k.clone(), v)
        })
        .collect()
}

/// All-or-nothing: one element that is not a timestamp makes every cell text.
fn primitive_list(items: &[Value], ref_id: &str) -> Table {
    let mut table = Table::new(TABLE_NAME, ref_id);
    let times: Option<Vec<_>> = items.iter().map(normalize).collect();
    let column = match times {
        Some(times) => Column::new("value", ColumnValues::Time(times.into_iter().map(Some).collect())),
        None => Column::strings("value", items.iter().map(display)),
    };
    table.push(column);
    table
}

fn key_value(obj: &Map<String, Value>, ref_id: &str) -> Table {
    let mut entries: Vec<(&String, &Value)> = obj.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let mut table = Table::new(TABLE_NAME, ref_id);
    table.push(Column::strings("key", entries.iter().map(|(k, _)| k.to_string())));
    let values: Vec<&Value> = entries.iter().map(|(_, v)| *v).collect();
    table.push(build_column("value", &values, TimeReinterpret::Never));
    table
}
