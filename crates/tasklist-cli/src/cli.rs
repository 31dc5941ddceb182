use clap::{Parser, Subcommand, ValueEnum};

/// CLI surface definition. Every task subcommand maps onto one task store operation.
#[derive(Parser, Debug)]
#[command(
    name = "tasklist",
    about = "A small persistent task list for the terminal",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive TUI (press q or Esc to exit).
    Tui,
    #[command(flatten)]
    Task(TaskCommand),
    /// Print version and exit.
    Version,
    /// Run a storage round-trip check against the data directory.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Print the task list (honours the active-only filter).
    List,
    /// Add a task; the words are joined with spaces.
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Mark a task done, or not done again.
    Toggle { id: u64 },
    /// Delete a task.
    Delete { id: u64 },
    /// Delete every task marked done.
    ClearDone,
    /// Move a task to a position among the other tasks (0 is the top).
    Move { id: u64, index: usize },
    /// Show only active tasks.
    Filter { state: Switch },
    /// Show creation dates next to tasks.
    Dates { state: Switch },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

impl Switch {
    /// Resolve against the current value.
    pub fn apply(self, current: bool) -> bool {
        match self {
            Switch::On => true,
            Switch::Off => false,
            Switch::Toggle => !current,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
