//! A committed step in the history log.

use std::collections::BTreeSet;

use rewind_core::Diff;

/// One undo step: a diff plus the labels of every action folded into it.
///
/// Entries are never edited in place. Grouping builds a new entry with
/// [`HistoryEntry::absorb`] and swaps it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub diff: Diff,
    /// Each label appears at most once per entry.
    pub action_labels: BTreeSet<String>,
}

impl HistoryEntry {
    /// Starts a new entry from a single action's diff.
    pub fn new(diff: Diff, label: &str) -> Self {
        Self {
            diff: diff.with_action(label),
            action_labels: BTreeSet::from([label.to_string()]),
        }
    }

    /// Label of the action that opened this entry.
    pub fn opening_action(&self) -> Option<&str> {
        self.diff.action.as_deref()
    }

    pub fn contains_action(&self, label: &str) -> bool {
        self.action_labels.contains(label)
    }

    /// Returns a new entry covering this one followed by `newer`.
    pub fn absorb(&self, newer: &Diff, label: &str) -> Self {
        let mut action_labels = self.action_labels.clone();
        action_labels.insert(label.to_string());
        Self {
            diff: self.diff.coalesce(newer),
            action_labels,
        }
    }
}
