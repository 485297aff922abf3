//! Folding reconstructed slices back into full state.
//!
//! The controller never writes to the host's state. A successful navigation
//! hands the reconstructed watched slices to the container inside the
//! action; these helpers do the shallow fold on the container's side.

use rewind_core::Snapshot;

use crate::action::{Action, Request};
use crate::manager::StateContainer;

/// Shallow-merges a navigation action's reconstructed slices into `state`.
///
/// Slices marked `Value::Undefined` are removed.
///
/// Returns `None` for non-navigation actions and for navigations that
/// carried nothing (out-of-range requests).
pub fn fold_adjusted_reality(state: &Snapshot, action: &Action) -> Option<Snapshot> {
    if !matches!(action.request(), Request::Travel(_)) {
        return None;
    }
    let adjusted = action.adjusted_reality.as_ref()?;
    let mut folded = state.clone();
    for (slice, value) in adjusted {
        if value.is_undefined() {
            folded.remove(slice);
        } else {
            folded.insert(slice.clone(), value.clone());
        }
    }
    Some(folded)
}

/// Wraps an application reducer so navigation actions fold in the
/// reconstructed slices instead of the app's own result.
pub struct TimeTravelReducer<R> {
    app: R,
}

impl<R> TimeTravelReducer<R>
where
    R: Fn(&Snapshot, &Action) -> Snapshot,
{
    pub fn new(app: R) -> Self {
        Self { app }
    }

    /// Runs the app reducer, then overrides the result for navigation actions.
    pub fn reduce(&self, state: &Snapshot, action: &Action) -> Snapshot {
        let app_state = (self.app)(state, action);
        match action.request() {
            Request::Travel(_) => {
                fold_adjusted_reality(state, action).unwrap_or_else(|| state.clone())
            }
            Request::Reset | Request::Change => app_state,
        }
    }
}

/// Minimal state container driven by a [`TimeTravelReducer`].
///
/// `forward` reduces the action into the held state and hands the action
/// back, so callers can inspect what was dispatched.
pub struct ReducerStore<R> {
    state: Snapshot,
    reducer: TimeTravelReducer<R>,
}

impl<R> ReducerStore<R>
where
    R: Fn(&Snapshot, &Action) -> Snapshot,
{
    pub fn new(initial: Snapshot, app: R) -> Self {
        Self {
            state: initial,
            reducer: TimeTravelReducer::new(app),
        }
    }
}

impl<R> StateContainer for ReducerStore<R>
where
    R: Fn(&Snapshot, &Action) -> Snapshot,
{
    type Output = Action;

    fn get_state(&self) -> &Snapshot {
        &self.state
    }

    fn forward(&mut self, action: Action) -> Action {
        self.state = self.reducer.reduce(&self.state, &action);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::{snapshot_from_json, Value};
    use serde_json::json;

    fn snap(value: serde_json::Value) -> Snapshot {
        snapshot_from_json(value).unwrap()
    }

    fn bump(state: &Snapshot, _action: &Action) -> Snapshot {
        let mut next = state.clone();
        next.insert("calls".to_string(), Value::from(1));
        next
    }

    #[test]
    fn test_fold_ignores_normal_actions() {
        let mut action = Action::new("SET");
        action.adjusted_reality = Some(snap(json!({"a": 2})));
        assert!(fold_adjusted_reality(&snap(json!({"a": 1})), &action).is_none());
    }

    #[test]
    fn test_fold_without_adjusted_reality() {
        assert!(fold_adjusted_reality(&snap(json!({"a": 1})), &Action::backward()).is_none());
    }

    #[test]
    fn test_fold_is_shallow() {
        let mut action = Action::forward();
        action.adjusted_reality = Some(snap(json!({"user": {"name": "bo"}})));
        let folded = fold_adjusted_reality(
            &snap(json!({"user": {"name": "al", "age": 3}, "other": 1})),
            &action,
        )
        .unwrap();
        assert_eq!(folded, snap(json!({"user": {"name": "bo"}, "other": 1})));
    }

    #[test]
    fn test_fold_removes_marked_slices() {
        let mut action = Action::backward();
        let mut adjusted = snap(json!({"n": 0}));
        adjusted.insert("draft".to_string(), Value::Undefined);
        action.adjusted_reality = Some(adjusted);

        let folded =
            fold_adjusted_reality(&snap(json!({"n": 3, "draft": 1, "ui": true})), &action).unwrap();
        assert_eq!(folded, snap(json!({"n": 0, "ui": true})));
    }

    #[test]
    fn test_reducer_uses_app_result_for_normal_actions() {
        let reducer = TimeTravelReducer::new(bump);
        let next = reducer.reduce(&snap(json!({})), &Action::new("ANY"));
        assert_eq!(next["calls"], Value::from(1));
    }

    #[test]
    fn test_reducer_discards_app_result_for_navigation() {
        let reducer = TimeTravelReducer::new(bump);
        let mut action = Action::backward();
        action.adjusted_reality = Some(snap(json!({"a": 0})));

        let next = reducer.reduce(&snap(json!({"a": 5})), &action);
        assert_eq!(next, snap(json!({"a": 0})));

        // Out-of-range navigation leaves state untouched.
        let next = reducer.reduce(&snap(json!({"a": 5})), &Action::forward());
        assert_eq!(next, snap(json!({"a": 5})));
    }

    #[test]
    fn test_store_forward_returns_action() {
        let mut store = ReducerStore::new(snap(json!({})), bump);
        let returned = store.forward(Action::new("PING"));
        assert_eq!(returned.kind, "PING");
        assert_eq!(store.get_state()["calls"], Value::from(1));
    }
}
