use std::io::Write;

use color_eyre::Result;
use tasklist_core::storage::KeyValueStore;
use tasklist_task::TaskStore;

use crate::{cli::TaskCommand, config::Config, display};

/// Execute a task subcommand against `store`, writing user-facing output to `out`.
pub fn handle<S: KeyValueStore>(
    cmd: TaskCommand,
    store: &mut TaskStore<S>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TaskCommand::List => print_list(store, config, out)?,
        TaskCommand::Add { text } => {
            let task = store.add_task(&text.join(" "))?;
            writeln!(out, "Added task {}: {}", task.id, task.value)?;
        }
        TaskCommand::Toggle { id } => {
            if store.toggle_task(id)? {
                let done = store.get(id).is_some_and(|t| t.is_done);
                let label = if done { "done" } else { "not done" };
                writeln!(out, "Marked task {id} {label}.")?;
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskCommand::Delete { id } => {
            if store.delete_task(id)? {
                writeln!(out, "Deleted task {id}.")?;
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskCommand::ClearDone => {
            let removed = store.delete_done_tasks()?;
            writeln!(out, "Deleted {removed} done task(s).")?;
        }
        TaskCommand::Move { id, index } => {
            if store.reorder_task(id, index)? {
                let position = store.position_of(id).unwrap_or(index);
                writeln!(out, "Moved task {id} to position {position}.")?;
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskCommand::Filter { state } => {
            let value = state.apply(store.filter_active_only());
            store.set_filter_active_only(value)?;
            let label = if value { "active tasks only" } else { "all tasks" };
            writeln!(out, "Showing {label}.")?;
        }
        TaskCommand::Dates { state } => {
            let value = state.apply(store.show_dates());
            store.set_show_dates(value)?;
            let label = if value { "shown" } else { "hidden" };
            writeln!(out, "Creation dates {label}.")?;
        }
    }

    Ok(())
}

fn print_list<S: KeyValueStore>(
    store: &TaskStore<S>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let visible = store.visible_tasks();
    if visible.is_empty() {
        if store.tasks().is_empty() {
            writeln!(out, "No tasks yet. Add one with `tasklist add <text>`.")?;
        } else {
            writeln!(out, "No active tasks.")?;
        }
    }

    for task in &visible {
        write!(
            out,
            "{:>4} {} {}",
            task.id,
            display::done_marker(task.is_done),
            task.value
        )?;
        if store.show_dates() {
            write!(
                out,
                "  ({})",
                display::format_date(task.created_date, config.date_format())
            )?;
        }
        writeln!(out)?;
    }

    let hidden = store.tasks().len() - visible.len();
    if hidden > 0 {
        writeln!(out, "({hidden} done task(s) hidden)")?;
    }
    Ok(())
}
