//! Query requests and the open options bag forwarded to the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::Error;
use crate::time_vars::{self, TimeRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Storm,
    Call,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Storm => "/api/v1/storm",
            Endpoint::Call => "/api/v1/storm/call",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "stormQuery")]
    pub storm_query: String,
    #[serde(rename = "useCall", default)]
    pub use_call: bool,
    #[serde(default)]
    pub opts: Options,
}

impl QueryRequest {
    pub fn new(storm_query: impl ToString) -> Self {
        Self {
            storm_query: storm_query.to_string(),
            ..Default::default()
        }
    }

    pub fn with_call(mut self, use_call: bool) -> Self {
        self.use_call = use_call;
        self
    }

    pub fn with_opts(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.storm_query.trim().is_empty() {
            return Err(Error::InvalidRequest("storm query is empty".to_string()));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        if self.use_call {
            Endpoint::Call
        } else {
            Endpoint::Storm
        }
    }

    /// Writes the time variables into `opts.vars`.
    pub fn inject_time_range(&mut self, range: &TimeRange) {
        time_vars::inject(self.opts.vars_mut(), range);
    }

    /// Outbound body: `{"query": ..., "opts": ...}`.
    pub fn body(&self) -> Value {
        json!({
            "query": self.storm_query,
            "opts": Value::Object(self.opts.0.clone()),
        })
    }
}

/// The options bag. Only a handful of keys mean anything here, the rest are
/// carried through to the store untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(pub Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl ToString, value: Value) -> Option<Value> {
        self.0.insert(key.to_string(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn limit(&self) -> Option<u64> {
        self.get("limit").and_then(Value::as_u64)
    }

    pub fn readonly(&self) -> Option<bool> {
        self.get("readonly").and_then(Value::as_bool)
    }

    pub fn repr(&self) -> Option<bool> {
        self.get("repr").and_then(Value::as_bool)
    }

    /// Only a literal `true` turns flattening on.
    pub fn flatten(&self) -> bool {
        matches!(self.get("flatten"), Some(Value::Bool(true)))
    }

    pub fn editformat(&self) -> Option<&str> {
        self.get("editformat").and_then(Value::as_str)
    }

    pub fn mode(&self) -> Option<&str> {
        self.get("mode").and_then(Value::as_str)
    }

    pub fn path(&self) -> Option<&str> {
        self.get("path").and_then(Value::as_str)
    }

    pub fn links(&self) -> Option<bool> {
        self.get("links").and_then(Value::as_bool)
    }

    pub fn view(&self) -> Option<&str> {
        self.get("view").and_then(Value::as_str)
    }

    pub fn vars(&self) -> Option<&Map<String, Value>> {
        self.get("vars").and_then(Value::as_object)
    }

    /// The variables bag, replacing a missing or non-object entry with `{}`.
    pub fn vars_mut(&mut self) -> &mut Map<String, Value> {
        let vars = self
            .0
            .entry("vars")
            .or_insert_with(|| Value::Object(Map::new()));
        if !vars.is_object() {
            *vars = Value::Object(Map::new());
        }
        match vars {
            Value::Object(map) => map,
            _ => unreachable!("vars was just set to an object"),
        }
    }

    /// Fills in keys missing from `self`; keys already present win.
    pub fn merge_defaults(&mut self, defaults: &Options) {
        for (key, value) in &defaults.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
