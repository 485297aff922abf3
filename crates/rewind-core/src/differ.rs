//! Structural differ producing change/revert pairs between two snapshots.
//!
//! This is a deep diff tuned for application state, not a general one:
//! lists and timestamps are captured wholesale, only nested maps recurse.

use crate::merger::{merge, MergeOptions};
use crate::value::{Snapshot, Value};

/// Delta between two snapshots.
///
/// Merging `change` onto the old snapshot yields the new one; merging
/// `revert` onto the new snapshot yields the old one. A `Value::Undefined`
/// in either half marks a deleted key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diff {
    pub change: Snapshot,
    pub revert: Snapshot,
    /// Label of the action that produced this diff, used for grouping.
    pub action: Option<String>,
}

impl Diff {
    /// Tags the diff with the label of the action that produced it.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Replays the diff forward onto the snapshot it was taken from.
    pub fn apply(&self, old: &Snapshot) -> Snapshot {
        merge(old, &self.change, MergeOptions::default())
    }

    /// Rolls the diff back from the snapshot it produced.
    pub fn unapply(&self, new: &Snapshot) -> Snapshot {
        merge(new, &self.revert, MergeOptions::default())
    }

    /// Combines this diff with the `newer` one that directly follows it.
    ///
    /// The result goes from the state before `self` to the state after
    /// `newer` in one step: newer changes win in `change`, older reverts win
    /// in `revert`. Deletion markers from either side are kept. The label
    /// stays on whichever action opened the group.
    pub fn coalesce(&self, newer: &Diff) -> Diff {
        let (change, revert) =
            coalesce_halves(&self.change, &self.revert, &newer.change, &newer.revert);
        Diff {
            change,
            revert,
            action: self.action.clone().or_else(|| newer.action.clone()),
        }
    }
}

/// Combines the halves of two consecutive diffs into one change/revert pair.
///
/// A plain merge of nested maps would union a map the older diff replaced
/// (or deleted) with the one the newer diff put back. Those keys are diffed
/// afresh, since the older revert and newer change then hold whole values.
fn coalesce_halves(
    older_change: &Snapshot,
    older_revert: &Snapshot,
    newer_change: &Snapshot,
    newer_revert: &Snapshot,
) -> (Snapshot, Snapshot) {
    let options = MergeOptions {
        copy_undefined: true,
    };
    let mut change = merge(older_change, newer_change, options);
    let mut revert = merge(newer_revert, older_revert, options);

    for (key, after) in newer_change {
        let (Some(Value::Map(before)), Value::Map(after)) = (older_revert.get(key), after) else {
            continue;
        };
        let exact = match (older_change.get(key), newer_revert.get(key)) {
            (Some(Value::Map(older_mid)), Some(Value::Map(newer_mid))) => {
                Some(coalesce_halves(older_mid, before, after, newer_mid))
            }
            _ => diff(before, after).map(|nested| (nested.change, nested.revert)),
        };
        match exact {
            Some((nested_change, nested_revert)) => {
                change.insert(key.clone(), Value::from(nested_change));
                revert.insert(key.clone(), Value::from(nested_revert));
            }
            None => {
                change.remove(key);
                revert.remove(key);
            }
        }
    }

    (change, revert)
}

/// Computes the delta from `old` to `new`.
///
/// Returns `None` when the two snapshots are the same object or are
/// structurally equal on every key.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Option<Diff> {
    if std::ptr::eq(old, new) {
        return None;
    }

    let mut change = Snapshot::new();
    let mut revert = Snapshot::new();

    // Deleted keys
    for (key, old_value) in old {
        if !new.contains_key(key) && !old_value.is_undefined() {
            revert.insert(key.clone(), old_value.clone());
            change.insert(key.clone(), Value::Undefined);
        }
    }

    for (key, new_value) in new {
        let old_value = old.get(key).unwrap_or(&Value::Undefined);
        if old_value.is_identical(new_value) {
            continue;
        }

        // Brand new key
        if old_value.is_undefined() {
            revert.insert(key.clone(), Value::Undefined);
            change.insert(key.clone(), new_value.clone());
            continue;
        }

        match (old_value, new_value) {
            (Value::List(_), Value::List(_)) | (Value::Timestamp(_), Value::Timestamp(_)) => {
                if old_value == new_value {
                    continue;
                }
            }
            (Value::Map(old_map), Value::Map(new_map)) => {
                if let Some(nested) = diff(old_map, new_map) {
                    revert.insert(key.clone(), Value::from(nested.revert));
                    change.insert(key.clone(), Value::from(nested.change));
                }
                continue;
            }
            _ => {}
        }

        revert.insert(key.clone(), old_value.clone());
        change.insert(key.clone(), new_value.clone());
    }

    if change.is_empty() && revert.is_empty() {
        return None;
    }
    Some(Diff {
        change,
        revert,
        action: None,
    })
}
