use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Float,
    Bool,
    Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Class {
    Int,
    Float,
    Bool,
    Other,
}

/// Picks the least lossy common type for a column.
///
/// Precedence: anything non-numeric and non-boolean makes a string column;
/// booleans alone make a bool column; then float wins over int. Empty or
/// all-null input is a string column.
pub fn classify<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
    let (mut has_int, mut has_float, mut has_bool, mut has_other) = (false, false, false, false);
    for value in values {
        match class_of(value) {
            None => {}
            Some(Class::Int) => has_int = true,
            Some(Class::Float) => has_float = true,
            Some(Class::Bool) => has_bool = true,
            Some(Class::Other) => has_other = true,
        }
    }
    if has_other {
        ColumnType::String
    } else if has_bool && !has_int && !has_float {
        ColumnType::Bool
    } else if has_float {
        ColumnType::Float
    } else if has_int {
        ColumnType::Int
    } else {
        ColumnType::String
    }
}

fn class_of(value: &Value) -> Option<Class> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(Class::Bool),
        Value::Number(n) => Some(match n.as_f64() {
            Some(v) if is_integral(v) => Class::Int,
            _ => Class::Float,
        }),
        Value::String(s) => Some(match s.parse::<f64>() {
            Ok(v) if is_integral(v) => Class::Int,
            Ok(_) => Class::Float,
            Err(_) => Class::Other,
        }),
        Value::Array(_) | Value::Object(_) => Some(Class::Other),
    }
}

pub(crate) fn is_integral(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_json(v: Value) -> ColumnType {
        let Value::Array(values) = v else {
            panic!("expected array")
        };
        classify(&values)
    }

    #[test]
    fn test_basic_types() {
        assert_eq!(classify_json(json!([1, 2, 3])), ColumnType::Int);
        assert_eq!(classify_json(json!([1, 2.5])), ColumnType::Float);
        assert_eq!(classify_json(json!(["a", 1])), ColumnType::String);
        assert_eq!(classify_json(json!([true, false])), ColumnType::Bool);
        assert_eq!(classify_json(json!([])), ColumnType::String);
    }

    #[test]
    fn test_nulls_are_ignored() {
        assert_eq!(classify_json(json!([null, null])), ColumnType::String);
        assert_eq!(classify_json(json!([null, 4, null])), ColumnType::Int);
        assert_eq!(classify_json(json!([true, null])), ColumnType::Bool);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(classify_json(json!(["42", 7])), ColumnType::Int);
        assert_eq!(classify_json(json!(["4.2", 7])), ColumnType::Float);
        assert_eq!(classify_json(json!([2.0, 3])), ColumnType::Int);
    }

    #[test]
    fn test_precedence() {
        // booleans mixed with numbers fall through to the numeric rules
        assert_eq!(classify_json(json!([true, 1])), ColumnType::Int);
        assert_eq!(classify_json(json!([true, 1.5])), ColumnType::Float);
        assert_eq!(classify_json(json!([true, "x"])), ColumnType::String);
        assert_eq!(classify_json(json!([1, [1, 2]])), ColumnType::String);
        assert_eq!(classify_json(json!([{"a": 1}])), ColumnType::String);
    }
}
