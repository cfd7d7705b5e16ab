//! Best-effort detection of timestamps in untyped values.
//!
//! Storm stores times as epoch milliseconds, but results that pass through
//! user code can carry seconds, millisecond strings or formatted dates. Every
//! function here returns `None` on a miss; callers decide the fallback.

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use serde_json::Value;

/// Case-insensitive substrings that mark a column or property name as a time.
pub const TIME_HINTS: [&str; 9] = [
    "created",
    "seen",
    "time",
    "modified",
    "updated",
    "accessed",
    "published",
    "date",
    "timestamp",
];

/// Formats tried after RFC 3339, all read as UTC.
const FIXED_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S",
];

const SECONDS_BAND: (f64, f64) = (1e9, 2e9);
const MILLIS_BAND: (f64, f64) = (1e12, 2e12);

pub fn is_time_name(name: &str) -> bool {
    let name = name.to_lowercase();
    TIME_HINTS.iter().any(|hint| name.contains(hint))
}

/// Normalizes a JSON scalar into an absolute time.
///
/// Numbers must exceed `1e9` and are always read as milliseconds; this is
/// stricter than the banded parsing applied to numeric strings.
pub fn normalize(value: &Value) -> Option<Timestamp> {
    match value {
        Value::Number(n) => {
            let v = n.as_f64()?;
            if v > 1e9 {
                from_millis(v)
            } else {
                None
            }
        }
        Value::String(s) => normalize_str(s),
        _ => None,
    }
}

pub fn normalize_str(s: &str) -> Option<Timestamp> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = s.parse::<Timestamp>() {
        return truncate_millis(ts);
    }
    for format in FIXED_FORMATS {
        if let Ok(dt) = DateTime::strptime(format, s) {
            let Ok(zoned) = dt.to_zoned(TimeZone::UTC) else {
                continue;
            };
            return truncate_millis(zoned.timestamp());
        }
    }
    let v = s.parse::<f64>().ok()?;
    if in_band(v, MILLIS_BAND) {
        from_millis(v)
    } else if in_band(v, SECONDS_BAND) {
        Timestamp::from_second(v as i64).ok()
    } else {
        None
    }
}

fn in_band(v: f64, (lo, hi): (f64, f64)) -> bool {
    v > lo && v < hi
}

fn from_millis(v: f64) -> Option<Timestamp> {
    if !v.is_finite() {
        return None;
    }
    Timestamp::from_millisecond(v as i64).ok()
}

fn truncate_millis(ts: Timestamp) -> Option<Timestamp> {
    Timestamp::from_millisecond(ts.as_millisecond()).ok()
}
