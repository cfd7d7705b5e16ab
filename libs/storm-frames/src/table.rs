//! Typed, row-aligned tables and the column builder shared by both decoders.

use jiff::Timestamp;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::classify::{ColumnType, classify};
use crate::flatten::display;
use crate::timestamp::{is_time_name, normalize};

pub(crate) static NULL: Value = Value::Null;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub ref_id: String,
    pub columns: Vec<Column>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub values: ColumnValues,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnValues {
    String(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Time(Vec<Option<Timestamp>>),
}

/// Whether a time-named numeric column may be reread as a time column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeReinterpret {
    Never,
    Numeric,
}

impl Table {
    pub fn new(name: impl ToString, ref_id: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ref_id: ref_id.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, column: Column) {
        debug_assert!(
            self.columns.first().is_none_or(|c| c.len() == column.len()),
            "column {} has {} rows, table has {}",
            column.name,
            column.len(),
            self.num_rows()
        );
        self.columns.push(column);
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl Column {
    pub fn new(name: impl ToString, values: ColumnValues) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    /// A string column with no null cells.
    pub fn strings(name: impl ToString, values: impl IntoIterator<Item = String>) -> Self {
        Self::new(
            name,
            ColumnValues::String(values.into_iter().map(Some).collect()),
        )
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::String(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match &self.values {
            ColumnValues::String(_) => ColumnType::String,
            ColumnValues::Int(_) => ColumnType::Int,
            ColumnValues::Float(_) => ColumnType::Float,
            ColumnValues::Bool(_) => ColumnType::Bool,
            ColumnValues::Time(_) => ColumnType::Time,
        }
    }

    /// Text of one cell, `None` for a null cell or an out of range row.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::String(v) => v.get(row)?.clone(),
            ColumnValues::Int(v) => v.get(row)?.map(|x| x.to_string()),
            ColumnValues::Float(v) => v.get(row)?.map(|x| x.to_string()),
            ColumnValues::Bool(v) => v.get(row)?.map(|x| x.to_string()),
            ColumnValues::Time(v) => v.get(row)?.map(|x| x.to_string()),
        }
    }
}

/// Builds one typed column from raw per-row cells.
pub fn build_column(name: &str, cells: &[&Value], reinterpret: TimeReinterpret) -> Column {
    let column_type = classify(cells.iter().copied());
    if reinterpret == TimeReinterpret::Numeric
        && matches!(column_type, ColumnType::Int | ColumnType::Float)
        && is_time_name(name)
    {
        let times: Vec<Option<Timestamp>> = cells.iter().map(|v| normalize(v)).collect();
        if times.iter().any(Option::is_some) {
            return Column::new(name, ColumnValues::Time(times));
        }
        trace!(column = name, "no cell normalized, keeping numeric column");
    }
    coerce_column(name, cells, column_type)
}

/// A time column where every cell is normalized and misses become null.
pub fn time_column(name: &str, cells: &[&Value]) -> Column {
    Column::new(
        name,
        ColumnValues::Time(cells.iter().map(|v| normalize(v)).collect()),
    )
}

pub fn coerce_column(name: &str, cells: &[&Value], column_type: ColumnType) -> Column {
    let values = match column_type {
        ColumnType::Int => ColumnValues::Int(cells.iter().map(|v| to_int(v)).collect()),
        ColumnType::Float => ColumnValues::Float(cells.iter().map(|v| to_float(v)).collect()),
        ColumnType::Bool => ColumnValues::Bool(cells.iter().map(|v| v.as_bool()).collect()),
        ColumnType::Time => ColumnValues::Time(cells.iter().map(|v| normalize(v)).collect()),
        ColumnType::String => ColumnValues::String(
            cells
                .iter()
                .map(|v| (!v.is_null()).then(|| display(v)))
                .collect(),
        ),
    };
    Column::new(name, values)
}

fn to_int(value: &Value) -> Option<i64> {
    let int = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    if int.is_none() && !value.is_null() {
        trace!(?value, "cell not coercible to int");
    }
    int
}

fn to_float(value: &Value) -> Option<f64> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    if float.is_none() && !value.is_null() {
        trace!(?value, "cell not coercible to float");
    }
    float
}
