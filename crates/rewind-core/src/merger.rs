//! Opinionated deep merge of one snapshot over another.
//!
//! Source lists, timestamps and scalars always replace the destination
//! value. Source maps merge recursively. Destination subtrees the source
//! does not touch are shared with the result, never deep-copied.

use std::sync::Arc;

use crate::value::{Snapshot, Value};

/// Options for [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Keep `Value::Undefined` source entries in the result instead of
    /// treating them as deletions. Used when combining two diffs, where the
    /// marker itself is the payload.
    pub copy_undefined: bool,
}

/// Merges `source` over `destination` into a new snapshot.
///
/// Neither input is modified.
pub fn merge(destination: &Snapshot, source: &Snapshot, options: MergeOptions) -> Snapshot {
    let mut merged = Snapshot::new();

    for (key, value) in source {
        if destination.contains_key(key) {
            continue;
        }
        // Deleting a key the destination never had is a no-op.
        if value.is_undefined() && !options.copy_undefined {
            continue;
        }
        merged.insert(key.clone(), adopt(value, options));
    }

    for (key, value) in destination {
        match source.get(key) {
            None => {
                merged.insert(key.clone(), value.clone());
            }
            Some(Value::Undefined) if !options.copy_undefined => {}
            Some(Value::Map(source_map)) => {
                merged.insert(key.clone(), merge_nested(value, source_map, options));
            }
            Some(source_value) => {
                merged.insert(key.clone(), source_value.clone());
            }
        }
    }

    merged
}

/// Merges a nested source map over whatever the destination holds at that key.
///
/// When the destination is not a map there is nothing to merge into, and
/// the source map is adopted.
fn merge_nested(destination: &Value, source: &Arc<Snapshot>, options: MergeOptions) -> Value {
    match destination {
        Value::Map(dest_map) => Value::Map(Arc::new(merge(dest_map, source, options))),
        _ => adopt_map(source, options),
    }
}

/// Takes a source value that has no destination counterpart.
fn adopt(value: &Value, options: MergeOptions) -> Value {
    match value {
        Value::Map(map) => adopt_map(map, options),
        _ => value.clone(),
    }
}

/// Shares the source map unless it still carries deletion markers that
/// must not reach the result.
fn adopt_map(map: &Arc<Snapshot>, options: MergeOptions) -> Value {
    if options.copy_undefined || !has_undefined(map) {
        return Value::Map(Arc::clone(map));
    }
    Value::Map(Arc::new(merge(&Snapshot::new(), map, options)))
}

fn has_undefined(map: &Snapshot) -> bool {
    map.values().any(|value| match value {
        Value::Undefined => true,
        Value::Map(nested) => has_undefined(nested),
        _ => false,
    })
}
