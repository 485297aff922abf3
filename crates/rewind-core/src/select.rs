//! Projection of the watched slices out of a full state snapshot.

use crate::value::Snapshot;

/// Returns a new snapshot holding only the named slices of `state`.
///
/// An empty watch list watches everything and returns the whole state.
/// Names missing from `state` are left out of the result.
pub fn select_slices(state: &Snapshot, slices: &[String]) -> Snapshot {
    if slices.is_empty() {
        return state.clone();
    }
    slices
        .iter()
        .filter_map(|name| state.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}
