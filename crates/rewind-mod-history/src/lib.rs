//! Undo/redo history for keyed application state.
//!
//! Provides a `HistoryController` that sits in front of a host state
//! container, records structural diffs of the watched slices after every
//! action, and answers time travel requests by reconstructing earlier or
//! later slices from those diffs. History is in-memory and linear.

pub mod action;
pub mod config;
pub mod entry;
pub mod groups;
pub mod manager;
pub mod reducer;

pub use action::{
    Action, Direction, Request, TIME_TRAVEL_BACKWARD, TIME_TRAVEL_FORWARD, TIME_TRAVEL_RESET,
};
pub use config::HistoryConfig;
pub use entry::HistoryEntry;
pub use groups::ActionGroups;
pub use manager::{HistoryController, StateContainer};
pub use reducer::{fold_adjusted_reality, ReducerStore, TimeTravelReducer};
