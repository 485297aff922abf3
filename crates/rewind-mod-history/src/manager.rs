//! History controller: records diffs of the watched state and replays them
//! on time travel requests.
//!
//! Every normal action is forwarded to the state container first. The
//! resulting watched slices are diffed against the cached previous slices,
//! and the diff is appended to history, grouped into the newest entry, or
//! recorded on top of a discarded future. Navigation requests reconstruct
//! the watched slices from one entry's `revert` or `change` half.

use std::collections::{HashSet, VecDeque};

use anyhow::{Context, Result};
use rewind_core::{diff, merge, select_slices, Diff, MergeOptions, Snapshot};

use crate::action::{Action, Direction, Request};
use crate::config::HistoryConfig;
use crate::entry::HistoryEntry;
use crate::groups::ActionGroups;

/// Index of the newest history entry.
const NEWEST_HISTORY_INDEX: usize = 0;

/// The host's state container, as seen by the controller.
pub trait StateContainer {
    /// Whatever the container's dispatch pipeline returns.
    type Output;

    /// Current full state.
    fn get_state(&self) -> &Snapshot;

    /// Runs the action through the rest of the pipeline.
    fn forward(&mut self, action: Action) -> Self::Output;
}

/// Tracks linear undo/redo history for one state container.
///
/// History is ordered newest first. `cursor` is the entry currently applied
/// and `direction` is the last navigation, which decides whether the next
/// request moves to a neighbouring entry or replays the other half of the
/// current one.
pub struct HistoryController {
    history: VecDeque<HistoryEntry>,
    cursor: usize,
    direction: Direction,
    /// Last observed watched slices. `None` until the first action, and
    /// again after a reset.
    previous: Option<Snapshot>,
    groups: ActionGroups,
    ignored: HashSet<String>,
    config: HistoryConfig,
}

impl std::fmt::Debug for HistoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryController")
            .field("history_len", &self.history.len())
            .field("cursor", &self.cursor)
            .field("direction", &self.direction)
            .field("has_baseline", &self.previous.is_some())
            .field("max_history_length", &self.config.max_history_length)
            .finish()
    }
}

impl HistoryController {
    /// Creates a controller with empty history.
    ///
    /// Action labels listed in more than one group are logged and keep their
    /// first group; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: HistoryConfig) -> Result<Self> {
        config
            .validate()
            .context("Invalid history configuration")?;

        let groups = ActionGroups::build(&config.actions_to_group);
        let ignored = config.actions_to_ignore.iter().cloned().collect();

        Ok(Self {
            history: VecDeque::new(),
            cursor: NEWEST_HISTORY_INDEX,
            direction: Direction::Forward,
            previous: None,
            groups,
            ignored,
            config,
        })
    }

    /// Handles one action end to end and returns the container's output.
    pub fn dispatch<C: StateContainer>(&mut self, container: &mut C, action: Action) -> C::Output {
        match action.request() {
            Request::Travel(direction) => self.travel(container, action, direction),
            Request::Reset => {
                self.reset();
                container.forward(action)
            }
            Request::Change => self.record(container, action),
        }
    }

    /// Drops all history and the diff baseline.
    pub fn reset(&mut self) {
        self.previous = None;
        self.history.clear();
        self.cursor = NEWEST_HISTORY_INDEX;
        self.direction = Direction::Forward;
        tracing::debug!("History reset");
    }

    /// Entries, newest first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The watched slices the next change will be diffed against.
    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Whether a backward request would move.
    pub fn can_undo(&self) -> bool {
        self.travel_target(Direction::Backward).is_some()
    }

    /// Whether a forward request would move.
    pub fn can_redo(&self) -> bool {
        self.travel_target(Direction::Forward).is_some()
    }

    fn record<C: StateContainer>(&mut self, container: &mut C, action: Action) -> C::Output {
        let label = action.kind.clone();
        let output = container.forward(action);
        let next = select_slices(container.get_state(), &self.config.slices_to_watch);

        // No baseline yet: initial data loads never become history.
        let Some(previous) = self.previous.take() else {
            tracing::trace!("Cached diff baseline after {label}");
            self.previous = Some(next);
            return output;
        };
        if self.ignored.contains(&label) {
            tracing::trace!("Ignored {label} for history");
            self.previous = Some(next);
            return output;
        }

        let delta = diff(&previous, &next);
        self.previous = Some(next);

        if let Some(delta) = delta {
            self.commit(delta, &label);
        }
        output
    }

    /// Adds a diff to history at the current position.
    fn commit(&mut self, delta: Diff, label: &str) {
        if self.is_in_past() {
            // The entry under a backward cursor is already undone, so it goes too.
            let keep_from = match self.direction {
                Direction::Backward => self.cursor + 1,
                Direction::Forward => self.cursor,
            };
            let discarded = keep_from.min(self.history.len());
            self.history.drain(..discarded);
            self.cursor = NEWEST_HISTORY_INDEX;
            self.direction = Direction::Forward;
            tracing::debug!("Discarded {discarded} abandoned history entries before {label}");
            self.history.push_front(HistoryEntry::new(delta, label));
        } else {
            let grouped = self
                .history
                .front()
                .filter(|head| self.groups_with(head, label))
                .map(|head| head.absorb(&delta, label));
            match grouped {
                Some(entry) => {
                    tracing::debug!("Grouped {label} into newest history entry");
                    self.history[NEWEST_HISTORY_INDEX] = entry;
                }
                None => {
                    tracing::debug!("Recorded history entry for {label}");
                    self.history.push_front(HistoryEntry::new(delta, label));
                }
            }
        }

        let max = self.config.max_history_length;
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.truncate(max);
            tracing::debug!("Trimmed {excess} oldest history entries");
        }
    }

    /// Whether the user has navigated away from the newest state.
    fn is_in_past(&self) -> bool {
        self.cursor != NEWEST_HISTORY_INDEX || self.direction == Direction::Backward
    }

    fn groups_with(&self, head: &HistoryEntry, label: &str) -> bool {
        let shares_group = head
            .opening_action()
            .is_some_and(|opening| self.groups.are_grouped(opening, label));
        shares_group && !head.contains_action(label)
    }

    /// Entry a request in `direction` would land on, if there is one.
    ///
    /// Continuing in the same direction moves one entry; reversing stays on
    /// the current entry and applies its other half.
    fn travel_target(&self, direction: Direction) -> Option<usize> {
        let target = if direction == self.direction {
            self.cursor.checked_add_signed(direction.step())?
        } else {
            self.cursor
        };
        (target < self.history.len()).then_some(target)
    }

    fn travel<C: StateContainer>(
        &mut self,
        container: &mut C,
        mut action: Action,
        direction: Direction,
    ) -> C::Output {
        let Some(target) = self.travel_target(direction) else {
            tracing::debug!(
                "No history to travel {direction:?} from entry {} of {}",
                self.cursor,
                self.history.len()
            );
            return container.forward(action);
        };

        self.cursor = target;
        self.direction = direction;

        let entry = &self.history[target];
        let half = match direction {
            Direction::Backward => &entry.diff.revert,
            Direction::Forward => &entry.diff.change,
        };

        // Reconstructed from the live state, not from the entry's own time.
        let watched = select_slices(container.get_state(), &self.config.slices_to_watch);
        let patch: Snapshot = half
            .iter()
            .filter(|(slice, _)| self.is_watched(slice))
            .map(|(slice, value)| (slice.clone(), value.clone()))
            .collect();
        let adjusted = merge(&watched, &patch, MergeOptions::default());

        // Removed slices travel as markers so the host can drop them too.
        let mut reality = adjusted.clone();
        reality.extend(
            patch
                .into_iter()
                .filter(|(_, value)| value.is_undefined()),
        );

        tracing::debug!("Travelled {direction:?} to history entry {target}");
        self.previous = Some(adjusted);
        action.adjusted_reality = Some(reality);
        container.forward(action)
    }

    fn is_watched(&self, slice: &str) -> bool {
        let watch_list = &self.config.slices_to_watch;
        watch_list.is_empty() || watch_list.iter().any(|name| name == slice)
    }
}
