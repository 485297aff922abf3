//! Structural snapshots and the diff/merge engine behind time travel.
//!
//! Snapshots are plain keyed trees of `Value`s. The differ turns two
//! snapshots into a `Diff` (a forward `change` and a backward `revert`),
//! and the merger folds either half back onto a snapshot.

pub mod differ;
pub mod merger;
pub mod select;
pub mod value;

pub use differ::{diff, Diff};
pub use merger::{merge, MergeOptions};
pub use select::select_slices;
pub use value::{snapshot_from_json, snapshot_to_json, Snapshot, Value};
