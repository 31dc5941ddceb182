//! The task store: owner of the ordered task collection and the two view
//! preferences, persisting every mutation through a `JsonStore`.

use std::collections::HashSet;

use tasklist_core::{
    storage::{JsonStore, KeyValueStore},
    tasks::{
        visible_tasks, Preferences, Task, TaskStoreError, FILTER_ACTIVE_KEY, SHOW_DATES_KEY,
        TASKS_KEY,
    },
};
use tracing::{debug, instrument, warn};

/// Source of `createdDate` values, in milliseconds since the Unix epoch.
pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// In-memory task list synchronized to a key-value store.
///
/// Construction only reads storage. Every mutation updates memory first and
/// then writes the affected key; mutations that match nothing write nothing.
pub struct TaskStore<S: KeyValueStore> {
    storage: JsonStore<S>,
    tasks: Vec<Task>,
    prefs: Preferences,
    /// Lowest id not yet handed out; `None` once the id space is used up.
    next_id: Option<u64>,
    clock: Clock,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load tasks and preferences from `store`, substituting defaults for
    /// anything absent or malformed.
    #[instrument(skip_all)]
    pub fn new(store: S) -> Self {
        let storage = JsonStore::new(store);
        let tasks = dedupe_ids(storage.load(TASKS_KEY, Vec::new()));
        let defaults = Preferences::default();
        let prefs = Preferences {
            filter_active_only: storage.load(FILTER_ACTIVE_KEY, defaults.filter_active_only),
            show_dates: storage.load(SHOW_DATES_KEY, defaults.show_dates),
        };
        let next_id = tasks
            .iter()
            .map(|task| task.id)
            .max()
            .map_or(Some(1), |max| max.checked_add(1));
        debug!(count = tasks.len(), ?next_id, ?prefs, "task store loaded");

        Self {
            storage,
            tasks,
            prefs,
            next_id,
            clock: Box::new(|| chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Replace the clock used to stamp `createdDate`. New ids never fall below
    /// its reading.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Full collection in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Collection as the list should show it right now.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        visible_tasks(&self.tasks, self.prefs.filter_active_only)
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Index of `id` in the full collection.
    pub fn position_of(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn filter_active_only(&self) -> bool {
        self.prefs.filter_active_only
    }

    pub fn show_dates(&self) -> bool {
        self.prefs.show_dates
    }

    /// Append a new, not-done task. Surrounding whitespace is trimmed and
    /// blank text is rejected.
    #[instrument(skip(self, text))]
    pub fn add_task(&mut self, text: &str) -> Result<Task, TaskStoreError> {
        let value = text.trim();
        if value.is_empty() {
            return Err(TaskStoreError::EmptyText);
        }

        let now = (self.clock)();
        let id = self.allocate_id(now)?;
        let task = Task::new(id, value.to_string(), now);
        self.tasks.push(task.clone());
        debug!(id = task.id, "task added");
        self.persist_tasks()?;
        Ok(task)
    }

    /// Flip `is_done` on `id`. Returns `false` if no such task exists.
    #[instrument(skip(self))]
    pub fn toggle_task(&mut self, id: u64) -> Result<bool, TaskStoreError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("toggle ignored, unknown task");
            return Ok(false);
        };
        task.is_done = !task.is_done;
        self.persist_tasks()?;
        Ok(true)
    }

    /// Remove `id`. Returns `false` if no such task exists.
    #[instrument(skip(self))]
    pub fn delete_task(&mut self, id: u64) -> Result<bool, TaskStoreError> {
        let Some(index) = self.position_of(id) else {
            debug!("delete ignored, unknown task");
            return Ok(false);
        };
        self.tasks.remove(index);
        self.persist_tasks()?;
        Ok(true)
    }

    /// Remove every done task, keeping the survivors' order. Returns how many
    /// were removed.
    #[instrument(skip(self))]
    pub fn delete_done_tasks(&mut self) -> Result<usize, TaskStoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.is_done);
        let removed = before - self.tasks.len();
        if removed == 0 {
            return Ok(0);
        }
        debug!(removed, "done tasks deleted");
        self.persist_tasks()?;
        Ok(removed)
    }

    /// Move `id` so it sits at `target_index` among the *other* tasks.
    /// An index at or past the end appends. Returns `false` if no such task
    /// exists.
    #[instrument(skip(self))]
    pub fn reorder_task(&mut self, id: u64, target_index: usize) -> Result<bool, TaskStoreError> {
        let Some(from) = self.position_of(id) else {
            debug!("reorder ignored, unknown task");
            return Ok(false);
        };

        let task = self.tasks.remove(from);
        let to = target_index.min(self.tasks.len());
        self.tasks.insert(to, task);
        if to == from {
            return Ok(true);
        }
        debug!(from, to, "task moved");
        self.persist_tasks()?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn set_filter_active_only(&mut self, value: bool) -> Result<(), TaskStoreError> {
        self.prefs.filter_active_only = value;
        self.storage.save(FILTER_ACTIVE_KEY, &value)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_show_dates(&mut self, value: bool) -> Result<(), TaskStoreError> {
        self.prefs.show_dates = value;
        self.storage.save(SHOW_DATES_KEY, &value)?;
        Ok(())
    }

    /// Flip the active-only filter and return its new value.
    pub fn toggle_filter_active_only(&mut self) -> Result<bool, TaskStoreError> {
        let value = !self.prefs.filter_active_only;
        self.set_filter_active_only(value)?;
        Ok(value)
    }

    /// Flip date display and return its new value.
    pub fn toggle_show_dates(&mut self) -> Result<bool, TaskStoreError> {
        let value = !self.prefs.show_dates;
        self.set_show_dates(value)?;
        Ok(value)
    }

    /// Hand out an id above every id this store has seen, and no lower than
    /// the clock, so ids from earlier sessions are not reused once their tasks
    /// are deleted.
    fn allocate_id(&mut self, now: i64) -> Result<u64, TaskStoreError> {
        let floor = u64::try_from(now).unwrap_or(0);
        let id = self
            .next_id
            .map(|next| next.max(floor))
            .ok_or(TaskStoreError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    fn persist_tasks(&self) -> Result<(), TaskStoreError> {
        self.storage.save(TASKS_KEY, &self.tasks)?;
        Ok(())
    }
}

/// Keep the first task for each id so the uniqueness invariant holds even
/// when storage was edited by hand.
fn dedupe_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let before = tasks.len();
    let unique: Vec<Task> = tasks.into_iter().filter(|task| seen.insert(task.id)).collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "dropped tasks with duplicate ids");
    }
    unique
}
