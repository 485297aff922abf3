//! Lookup table deciding which actions coalesce into one history entry.

use std::collections::{HashMap, HashSet};

/// Maps each grouped action label to the other labels in its group.
#[derive(Debug, Clone, Default)]
pub struct ActionGroups {
    peers: HashMap<String, HashSet<String>>,
    /// Labels listed in more than one group, in the order they were found.
    conflicts: Vec<String>,
}

impl ActionGroups {
    /// Builds the index from a list of groups.
    ///
    /// A label may belong to one group only. When a label shows up again in
    /// a later group the conflict is logged and the first group is kept.
    pub fn build(groups: &[Vec<String>]) -> Self {
        let mut peers: HashMap<String, HashSet<String>> = HashMap::new();
        let mut conflicts = Vec::new();

        for (group_index, group) in groups.iter().enumerate() {
            for label in group {
                if peers.contains_key(label) {
                    tracing::error!(
                        "Error building action groups: action {label:?} in group {group_index} \
                         already belongs to another group; actions can only belong to one group"
                    );
                    conflicts.push(label.clone());
                    continue;
                }
                let others = group
                    .iter()
                    .filter(|other| *other != label)
                    .cloned()
                    .collect();
                peers.insert(label.clone(), others);
            }
        }

        Self { peers, conflicts }
    }

    /// Other labels sharing a group with `label`, if it is grouped at all.
    pub fn peers(&self, label: &str) -> Option<&HashSet<String>> {
        self.peers.get(label)
    }

    /// Whether an action labelled `next` may coalesce into an entry opened by `previous`.
    pub fn are_grouped(&self, previous: &str, next: &str) -> bool {
        self.peers(previous)
            .is_some_and(|others| others.contains(next))
    }

    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty() {
        let index = ActionGroups::build(&[]);
        assert!(index.is_empty());
        assert!(!index.are_grouped("A", "B"));
    }

    #[test]
    fn test_peers_exclude_self() {
        let index = ActionGroups::build(&groups(&[&["A", "B", "C"]]));
        let peers = index.peers("A").unwrap();
        assert_eq!(peers.len(), 2);
        assert!(peers.contains("B"));
        assert!(peers.contains("C"));
        assert!(!peers.contains("A"));
    }

    #[test]
    fn test_are_grouped_is_symmetric_within_group() {
        let index = ActionGroups::build(&groups(&[&["A", "B"], &["X", "Y"]]));
        assert!(index.are_grouped("A", "B"));
        assert!(index.are_grouped("B", "A"));
        assert!(index.are_grouped("X", "Y"));
        assert!(!index.are_grouped("A", "X"));
        assert!(!index.are_grouped("A", "A"));
        assert!(!index.are_grouped("UNKNOWN", "A"));
    }

    #[test]
    fn test_conflict_keeps_first_group() {
        let index = ActionGroups::build(&groups(&[&["A", "B"], &["B", "C"]]));
        assert_eq!(index.conflicts(), &["B".to_string()]);
        assert!(index.are_grouped("B", "A"));
        assert!(!index.are_grouped("B", "C"));
        // C was still registered with its own group, which lists B.
        assert!(index.are_grouped("C", "B"));
    }

    #[test]
    fn test_no_conflicts_for_disjoint_groups() {
        let index = ActionGroups::build(&groups(&[&["A"], &["B", "C"]]));
        assert!(index.conflicts().is_empty());
        assert!(index.peers("A").unwrap().is_empty());
    }
}
