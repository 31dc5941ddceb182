use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// Storage key holding the ordered task collection.
pub const TASKS_KEY: &str = "tasks";
/// Storage key holding the active-only filter flag.
pub const FILTER_ACTIVE_KEY: &str = "showActiveTask";
/// Storage key holding the show-dates flag.
pub const SHOW_DATES_KEY: &str = "showTaskDates";

/// Task entity. Serialized with the camelCase field names used on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub is_done: bool,
    pub value: String,
    /// Milliseconds since the Unix epoch.
    pub created_date: i64,
}

impl Task {
    pub fn new(id: u64, value: String, created_date: i64) -> Self {
        Self {
            id,
            is_done: false,
            value,
            created_date,
        }
    }
}

/// The two persisted view flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub filter_active_only: bool,
    pub show_dates: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            filter_active_only: false,
            show_dates: true,
        }
    }
}

/// Errors surfaced by task store mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    /// Task text was empty or whitespace only.
    #[error("task text must not be empty")]
    EmptyText,
    /// Every id above the highest stored one has been handed out.
    #[error("no task ids left to assign")]
    IdsExhausted,
    /// Persisting the mutation failed; in-memory state already reflects it.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Filter `tasks` down to what the list should show, keeping order.
pub fn visible_tasks(tasks: &[Task], filter_active_only: bool) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| !filter_active_only || !task.is_done)
        .collect()
}
