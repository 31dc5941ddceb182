mod cli;
mod config;
mod display;
mod storage;
mod tasks;
mod tui;

use std::io;

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use tasklist_core::storage::KeyValueStore;
use tasklist_task::TaskStore;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI and the TUI to the file-backed task store.
fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    let command = cli.command.unwrap_or(cli::Command::Tui);
    // Anything logged while the TUI owns the screen would tear the frame.
    init_tracing(if command == cli::Command::Tui {
        "off"
    } else {
        "info"
    });

    let config = config::load()?;
    debug!(?config, "configuration loaded");
    match command {
        cli::Command::Tui => {
            let mut store = TaskStore::new(storage::store_from_config(&config)?);
            tui::launch(&mut store, config.date_format())?
        }
        cli::Command::Task(cmd) => {
            let mut store = TaskStore::new(storage::store_from_config(&config)?);
            tasks::handle(cmd, &mut store, &config, &mut io::stdout().lock())?
        }
        cli::Command::Version => print_version(),
        cli::Command::Health => run_health_check(&config)?,
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    // Respect user-provided filters; logs go to stderr so command output stays clean.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("tasklist {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick write/read/remove check against the configured data directory.
fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store)?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

fn run_store_health<S: KeyValueStore>(store: &S) -> Result<()> {
    let check_key = "health/check";
    let payload = "ok";
    store.set(check_key, payload)?;
    let round_trip = store.get(check_key)?;
    store.remove(check_key)?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tasklist_core::storage::{InMemoryKeyValueStore, StorageError};
    use tasklist_storage::file_store::FileKeyValueStore;

    use super::*;

    #[test]
    fn health_check_with_file_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        run_store_health(&store).expect("health check should succeed");
        assert!(matches!(
            store.get("health/check"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn health_check_with_memory_store_leaves_nothing_behind() {
        let store = InMemoryKeyValueStore::new();
        run_store_health(&store).expect("health check should succeed");
        assert!(store.is_empty());
    }

    #[test]
    fn file_backed_store_round_trips_between_sessions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config::Config {
            data_dir: Some(dir.path().to_path_buf()),
            date_format: None,
        };

        let mut first =
            TaskStore::new(storage::store_from_config(&config).expect("store")).with_clock(|| 0);
        first.add_task("Buy milk").expect("add");
        first.add_task("Walk dog").expect("add");
        first.toggle_task(1).expect("toggle");
        first.reorder_task(2, 0).expect("reorder");
        first.set_filter_active_only(true).expect("filter");

        let second = TaskStore::new(storage::store_from_config(&config).expect("store"));
        assert_eq!(second.tasks(), first.tasks());
        assert_eq!(second.preferences(), first.preferences());
        let visible: Vec<&str> = second
            .visible_tasks()
            .iter()
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(visible, vec!["Walk dog"]);
    }
}
