//! Storm nodes: `[[form, value], {"iden", "tags", "props", "reprs"}]`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::flatten::display;
use crate::table::{Column, NULL, Table, TimeReinterpret, build_column, time_column};
use crate::timestamp::is_time_name;

pub const PREFIX_COLUMNS: [&str; 4] = ["form", "value", "iden", "tags"];
pub const REPR_SUFFIX: &str = "_repr";

/// One decoded node, kept until the table is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
    pub form: String,
    pub value: String,
    pub iden: String,
    pub tags: String,
    pub props: BTreeMap<String, Value>,
}

impl NodeRecord {
    /// Parses a node payload, returning `None` when the shape is wrong.
    pub fn parse(payload: &Value) -> Option<Self> {
        let [def, info, ..] = payload.as_array()?.as_slice() else {
            return None;
        };
        let (form, value) = node_def(def)?;
        let mut record = NodeRecord {
            form: form.to_string(),
            value: display(value),
            ..Default::default()
        };
        let Some(info) = info.as_object() else {
            return Some(record);
        };
        if let Some(iden) = info.get("iden").and_then(Value::as_str) {
            record.iden = iden.to_string();
        }
        if let Some(tags) = info.get("tags").and_then(Value::as_object) {
            record.tags = tag_names(tags);
        }
        if let Some(props) = info.get("props").and_then(Value::as_object) {
            for (k, v) in props {
                record.props.insert(k.clone(), v.clone());
            }
        }
        if let Some(reprs) = info.get("reprs").and_then(Value::as_object) {
            for (k, v) in reprs {
                record.props.insert(format!("{k}{REPR_SUFFIX}"), v.clone());
            }
        }
        Some(record)
    }
}

fn node_def(def: &Value) -> Option<(&str, &Value)> {
    match def.as_array()?.as_slice() {
        [Value::String(form), value, ..] => Some((form.as_str(), value)),
        _ => None,
    }
}

fn tag_names(tags: &Map<String, Value>) -> String {
    let mut names: Vec<&str> = tags.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Shape probe for call results: does this look like a packed node?
pub fn is_node(value: &Value) -> bool {
    match value.as_array().map(Vec::as_slice) {
        Some([def, _, ..]) => node_def(def).is_some(),
        _ => false,
    }
}

/// Builds a node table; `with_props` adds one column per property key seen
/// across all records.
pub fn node_table(name: &str, ref_id: &str, records: &[NodeRecord], with_props: bool) -> Table {
    let mut table = Table::new(name, ref_id);
    table.push(Column::strings("form", records.iter().map(|r| r.form.clone())));
    table.push(Column::strings("value", records.iter().map(|r| r.value.clone())));
    table.push(Column::strings("iden", records.iter().map(|r| r.iden.clone())));
    table.push(Column::strings("tags", records.iter().map(|r| r.tags.clone())));
    if !with_props {
        return table;
    }

    let keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.props.keys().map(String::as_str))
        .collect();
    for key in keys {
        let cells: Vec<&Value> = records
            .iter()
            .map(|r| r.props.get(key).unwrap_or(&NULL))
            .collect();
        match key.strip_suffix(REPR_SUFFIX) {
            Some(base) if is_time_name(base) => continue,
            Some(_) => table.push(build_column(key, &cells, TimeReinterpret::Never)),
            None if is_time_name(key) => table.push(time_column(key, &cells)),
            None => table.push(build_column(key, &cells, TimeReinterpret::Never)),
        }
    }
    table
}
