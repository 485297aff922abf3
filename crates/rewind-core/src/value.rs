//! Tagged value tree used for snapshots and diff halves.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Number;

/// A keyed mapping of slice (or field) names to values.
///
/// Keys are kept ordered so diffs and debug output are deterministic.
pub type Snapshot = BTreeMap<String, Value>;

/// A node in a snapshot tree.
///
/// Lists and maps live behind `Arc`, so cloning a snapshot shares every
/// subtree instead of copying it. Two `Arc`s pointing at the same allocation
/// are treated as identical without walking their contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absent value. Inside a diff half this marks a deleted key.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Date-like value, compared by its instant.
    Timestamp(DateTime<Utc>),
    /// Ordered list. Diffed as a single unit, never element by element.
    List(Arc<Vec<Value>>),
    /// Nested keyed mapping. Diffed and merged recursively.
    Map(Arc<Snapshot>),
}

impl Value {
    /// Builds a `Value::Map` from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Builds a `Value::List` from items.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Returns the nested mapping if this is a plain map (not a list or timestamp).
    pub fn as_map(&self) -> Option<&Snapshot> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Cheap identity test: shared `Arc`s for lists and maps, equality for scalars.
    ///
    /// A `false` result does not mean the values differ structurally.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(_) | Value::List(_), _) | (_, Value::Map(_) | Value::List(_)) => false,
            (a, b) => a == b,
        }
    }

    /// Converts back to JSON.
    ///
    /// Timestamps render as RFC 3339 strings. `Undefined` entries are
    /// dropped from maps and become `null` inside lists.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => snapshot_to_json(map),
        }
    }

    fn kind(json: &serde_json::Value) -> &'static str {
        match json {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

/// Converts a JSON object into a snapshot.
///
/// # Errors
///
/// Returns an error if `json` is not an object: a snapshot needs
/// enumerable keys to be diffed or merged.
pub fn snapshot_from_json(json: serde_json::Value) -> Result<Snapshot> {
    match json {
        serde_json::Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        other => bail!(
            "Snapshot must be a JSON object, got {}",
            Value::kind(&other)
        ),
    }
}

/// Converts a snapshot into a JSON object, omitting `Undefined` entries.
pub fn snapshot_to_json(snapshot: &Snapshot) -> serde_json::Value {
    serde_json::Value::Object(
        snapshot
            .iter()
            .filter(|(_, value)| !value.is_undefined())
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(Arc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(fields) => Value::Map(Arc::new(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Snapshot> for Value {
    fn from(map: Snapshot) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}
