use crossterm::event::KeyCode;
use tasklist_core::{storage::KeyValueStore, tasks::Task};
use tasklist_task::TaskStore;
use tracing::warn;

/// What the key handler is currently doing. None of this is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a new task.
    Adding { input: String },
    /// A task has been picked up; `target` is the visible row it will occupy
    /// once dropped (`== visible len` means the end of the list).
    Dragging { source: u64, target: usize },
}

/// Renderer-local TUI state: selection, input buffer, drag state, status line.
#[derive(Debug)]
pub struct App {
    selected: usize,
    mode: Mode,
    status: Option<String>,
    quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            selected: 0,
            mode: Mode::Normal,
            status: None,
            quit: false,
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_key<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>, code: KeyCode) {
        self.status = None;
        match self.mode.clone() {
            Mode::Normal => self.handle_normal(store, code),
            Mode::Adding { input } => self.handle_adding(store, input, code),
            Mode::Dragging { source, target } => self.handle_dragging(store, source, target, code),
        }
        self.clamp_selection(store.visible_tasks().len());
    }

    fn handle_normal<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>, code: KeyCode) {
        let selected_id = store.visible_tasks().get(self.selected).map(|t| t.id);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected += 1,
            KeyCode::Char('a') => {
                self.mode = Mode::Adding {
                    input: String::new(),
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = selected_id {
                    self.report(store.toggle_task(id).map(|_| ()));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = selected_id {
                    self.report(store.delete_task(id).map(|_| ()));
                }
            }
            KeyCode::Char('D') => {
                let result = store.delete_done_tasks();
                if let Ok(removed) = &result {
                    self.status = Some(format!("Deleted {removed} done task(s)"));
                }
                self.report(result.map(|_| ()));
            }
            KeyCode::Char('f') => self.report(store.toggle_filter_active_only().map(|_| ())),
            KeyCode::Char('t') => self.report(store.toggle_show_dates().map(|_| ())),
            KeyCode::Char('m') => {
                if let Some(id) = selected_id {
                    self.mode = Mode::Dragging {
                        source: id,
                        target: self.selected,
                    };
                }
            }
            _ => {}
        }
    }

    fn handle_adding<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        mut input: String,
        code: KeyCode,
    ) {
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                match store.add_task(&input) {
                    Ok(task) => {
                        self.mode = Mode::Normal;
                        if let Some(index) = store.visible_tasks().iter().position(|t| t.id == task.id)
                        {
                            self.selected = index;
                        }
                    }
                    Err(err) => {
                        self.status = Some(err.to_string());
                        self.mode = Mode::Adding { input };
                    }
                }
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Adding { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::Adding { input };
            }
            _ => {}
        }
    }

    fn handle_dragging<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        source: u64,
        target: usize,
        code: KeyCode,
    ) {
        let rows = store.visible_tasks().len();
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Up | KeyCode::Char('k') => {
                self.mode = Mode::Dragging {
                    source,
                    target: target.saturating_sub(1),
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode = Mode::Dragging {
                    source,
                    target: (target + 1).min(rows),
                }
            }
            KeyCode::Enter => {
                let index = drop_index(store.tasks(), &store.visible_tasks(), source, target);
                self.report(store.reorder_task(source, index).map(|_| ()));
                self.mode = Mode::Normal;
                if let Some(row) = store.visible_tasks().iter().position(|t| t.id == source) {
                    self.selected = row;
                }
            }
            _ => {}
        }
    }

    fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    fn report<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(err) = result {
            warn!(%err, "task store update failed");
            self.status = Some(format!("Save failed: {err}"));
        }
    }
}

/// Translate a drop on visible row `target` into a collection index for
/// `reorder_task`. With the dragged task taken out of the visible rows, it is
/// spliced in at `target`: before the task now on that row, or at the end when
/// no row is left there.
pub fn drop_index(tasks: &[Task], visible: &[&Task], source: u64, target: usize) -> usize {
    let remaining: Vec<u64> = tasks
        .iter()
        .map(|t| t.id)
        .filter(|id| *id != source)
        .collect();

    visible
        .iter()
        .filter(|t| t.id != source)
        .nth(target)
        .and_then(|anchor| remaining.iter().position(|id| *id == anchor.id))
        .unwrap_or(remaining.len())
}
