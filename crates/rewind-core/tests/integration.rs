// Integration tests for the diff/merge engine.
//
// These walk a sequence of application states, keep only the diffs between
// neighbours, and rebuild every state from either end of the chain.

use rewind_core::{diff, select_slices, snapshot_from_json, Diff, Snapshot};
use serde_json::json;

fn states() -> Vec<Snapshot> {
    [
        json!({"todos": [], "filter": "all", "user": null}),
        json!({"todos": [{"id": 1, "text": "milk", "done": false}], "filter": "all", "user": null}),
        json!({"todos": [{"id": 1, "text": "milk", "done": true}], "filter": "all", "user": {"name": "ada"}}),
        json!({"todos": [{"id": 1, "text": "milk", "done": true}], "filter": "done", "user": {"name": "ada", "theme": "dark"}}),
        json!({"todos": [], "filter": "done", "user": {"name": "ada"}}),
        json!({"todos": [], "user": {"name": "grace"}, "draft": {"title": ""}}),
    ]
    .into_iter()
    .map(|s| snapshot_from_json(s).unwrap())
    .collect()
}

fn chain(states: &[Snapshot]) -> Vec<Diff> {
    states
        .windows(2)
        .map(|pair| diff(&pair[0], &pair[1]).expect("neighbouring states differ"))
        .collect()
}

#[test]
fn test_replay_forward_from_first_state() {
    let states = states();
    let diffs = chain(&states);

    let mut current = states[0].clone();
    for (d, expected) in diffs.iter().zip(&states[1..]) {
        current = d.apply(&current);
        assert_eq!(&current, expected);
    }
}

#[test]
fn test_replay_backward_from_last_state() {
    let states = states();
    let diffs = chain(&states);

    let mut current = states.last().unwrap().clone();
    for (d, expected) in diffs.iter().rev().zip(states.iter().rev().skip(1)) {
        current = d.unapply(&current);
        assert_eq!(&current, expected);
    }
}

#[test]
fn test_coalesced_chain_spans_whole_history() {
    let states = states();
    let diffs = chain(&states);

    let combined = diffs[1..]
        .iter()
        .fold(diffs[0].clone(), |acc, next| acc.coalesce(next));

    assert_eq!(combined.apply(&states[0]), *states.last().unwrap());
    assert_eq!(combined.unapply(states.last().unwrap()), states[0]);
}

#[test]
fn test_every_state_diffs_to_none_against_itself() {
    for state in states() {
        let copy = snapshot_from_json(rewind_core::snapshot_to_json(&state)).unwrap();
        assert!(diff(&state, &copy).is_none());
    }
}

#[test]
fn test_diff_of_watched_slices_only() {
    let states = states();
    let watched = ["user".to_string()];
    let old = select_slices(&states[2], &watched);
    let new = select_slices(&states[3], &watched);

    let d = diff(&old, &new).unwrap();
    assert_eq!(d.change.keys().collect::<Vec<_>>(), vec!["user"]);
    assert_eq!(d.apply(&old), new);
}
