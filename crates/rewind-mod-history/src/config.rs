//! Configuration for the history controller.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in the history log.
/// Oldest entries are dropped when this limit is exceeded.
const DEFAULT_MAX_HISTORY_LENGTH: usize = 25;

/// Configuration for the history system.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// partial JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Top-level state slices to diff and restore. Empty = watch everything.
    pub slices_to_watch: Vec<String>,
    /// Action labels whose changes never create history.
    pub actions_to_ignore: Vec<String>,
    /// Groups of action labels that coalesce into one history entry when
    /// dispatched back to back. A label may belong to one group only.
    pub actions_to_group: Vec<Vec<String>>,
    /// Max history entries. Must be positive.
    pub max_history_length: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            slices_to_watch: Vec::new(),
            actions_to_ignore: Vec::new(),
            actions_to_group: Vec::new(),
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
        }
    }
}

impl HistoryConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has fields of the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse history config")
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history config at {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid history config at {}", path.display()))
    }

    /// Checks the settings that cannot be recovered from at runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_history_length` is zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_history_length > 0,
            "max_history_length must be a positive integer, got {}",
            self.max_history_length
        );
        Ok(())
    }

    pub fn watching<I, S>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slices_to_watch = slices.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignoring<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions_to_ignore = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one group of actions that coalesce together.
    pub fn grouping<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions_to_group
            .push(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_history_length(mut self, max_history_length: usize) -> Self {
        self.max_history_length = max_history_length;
        self
    }
}
