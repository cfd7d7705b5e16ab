//! Time-range variables handed to Storm through `opts.vars`.
//!
//! Queries can filter with `.created@=($timeRange)` or build their own ranges
//! from `$timeFromMs`, `$dateFrom`, etc.

use jiff::{Timestamp, tz::TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TIME_FROM: &str = "timeFrom";
pub const TIME_TO: &str = "timeTo";
pub const TIME_RANGE: &str = "timeRange";
pub const DATE_FROM: &str = "dateFrom";
pub const DATE_TO: &str = "dateTo";
pub const TIME_FROM_MS: &str = "timeFromMs";
pub const TIME_TO_MS: &str = "timeToMs";
pub const TIME_FROM_SEC: &str = "timeFromSec";
pub const TIME_TO_SEC: &str = "timeToSec";

/// An absolute time interval. `from > to` is carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl TimeRange {
    pub fn new(from: Timestamp, to: Timestamp) -> Self {
        Self { from, to }
    }
}

/// Sets the nine time variables in `vars`, leaving every other key alone.
pub fn inject(vars: &mut Map<String, Value>, range: &TimeRange) {
    let from = format_iso(range.from);
    let to = format_iso(range.to);
    vars.insert(
        TIME_RANGE.to_string(),
        Value::Array(vec![Value::from(from.clone()), Value::from(to.clone())]),
    );
    vars.insert(TIME_FROM.to_string(), Value::from(from));
    vars.insert(TIME_TO.to_string(), Value::from(to));
    vars.insert(DATE_FROM.to_string(), Value::from(format_date(range.from)));
    vars.insert(DATE_TO.to_string(), Value::from(format_date(range.to)));
    vars.insert(
        TIME_FROM_MS.to_string(),
        Value::from(range.from.as_millisecond()),
    );
    vars.insert(TIME_TO_MS.to_string(), Value::from(range.to.as_millisecond()));
    vars.insert(TIME_FROM_SEC.to_string(), Value::from(range.from.as_second()));
    vars.insert(TIME_TO_SEC.to_string(), Value::from(range.to.as_second()));
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ` in UTC.
pub fn format_iso(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%Y-%m-%dT%H:%M:%S.%3fZ")
        .to_string()
}

/// `YYYY-MM-DD` in UTC.
pub fn format_date(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC).strftime("%Y-%m-%d").to_string()
}
