// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Command-line arguments for `droid-executor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "droid-executor",
    version,
    about = "Run a dependency graph of coding tasks through the droid CLI.",
    long_about = None,
    group(ArgGroup::new("input").required(true).args(["tasks", "objective"]))
)]
pub struct CliArgs {
    /// JSON file with the tasks: either an array of tasks or
    /// `{"tasks": [...], "context": {...}}`.
    #[arg(long, value_name = "PATH")]
    pub tasks: Option<PathBuf>,

    /// Run a single task with this objective instead of a task graph, and
    /// print the executor result.
    #[arg(long, value_name = "TEXT")]
    pub objective: Option<String>,

    /// Instructions for `--objective`.
    #[arg(long, value_name = "TEXT", requires = "objective")]
    pub instructions: Option<String>,

    /// Working directory for `--objective` (the task's `repo_root`).
    #[arg(long, value_name = "PATH", requires = "objective")]
    pub repo_root: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `droid.toml` in the current working directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of tasks running at the same time.
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Whole-graph deadline in seconds.
    #[arg(long, value_name = "SECS")]
    pub dag_timeout: Option<u64>,

    /// Validate the graph and print its execution levels, but don't run
    /// anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DROID_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
