// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task_file;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_effective};
use crate::dag::{TaskDef, TaskGraph};
use crate::engine::{RuntimeOptions, execute_dag};
use crate::errors::DroidError;
use crate::exec::{DroidExecutor, TaskPayload, build_prompt, is_success};
use crate::task_file::load_task_file;
use crate::types::RunStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, `DROID_*` env, CLI flags)
/// - the tasks file, or a single `--objective` task
/// - the droid executor and the DAG scheduler
///
/// Prints the run result as JSON on stdout and returns its status.
pub async fn run(args: CliArgs) -> Result<RunStatus> {
    let cfg = load_config(&args)?;
    let options = runtime_options(&cfg, &args)?;

    let Some(tasks_path) = args.tasks.as_deref() else {
        return run_single(&cfg, &args).await;
    };

    let (tasks, context) = load_task_file(tasks_path)
        .with_context(|| format!("reading tasks from '{}'", tasks_path.display()))?
        .into_parts();

    if args.dry_run {
        print_dry_run(&tasks)?;
        return Ok(RunStatus::Completed);
    }

    info!(
        tasks = tasks.len(),
        max_workers = options.max_workers,
        dag_timeout_secs = options.dag_timeout.as_secs(),
        "submitting task graph"
    );

    let executor = Arc::new(DroidExecutor::new(cfg.droid.clone()));
    let result = execute_dag(tasks, context, executor.clone(), options).await;

    if let Some(session) = executor.last_session_id() {
        info!(session_id = %session, "last droid session");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.status)
}

/// `--objective` mode: run one task through the droid executor, with no
/// graph around it, and print the normalized executor result.
async fn run_single(cfg: &ConfigFile, args: &CliArgs) -> Result<RunStatus> {
    let payload = single_payload(args);
    if args.dry_run {
        println!("{}", build_prompt(&payload));
        return Ok(RunStatus::Completed);
    }

    info!(objective_chars = payload.objective.chars().count(), "running single task");
    let executor = DroidExecutor::new(cfg.droid.clone());
    let result = executor.run(payload).await;

    if let Some(session) = executor.last_session_id() {
        info!(session_id = %session, "last droid session");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if is_success(&result) {
        RunStatus::Completed
    } else {
        RunStatus::Failed
    })
}

/// Payload for `--objective` mode. `--repo-root` becomes `context.repo_root`.
pub fn single_payload(args: &CliArgs) -> TaskPayload {
    let context = match &args.repo_root {
        Some(root) => json!({ "repo_root": root }),
        None => json!({}),
    };

    TaskPayload {
        objective: args.objective.clone().unwrap_or_default(),
        instructions: args.instructions.clone().unwrap_or_default(),
        context,
        ..TaskPayload::default()
    }
}

/// Resolve the config file: `--config`, else `droid.toml` if it exists, else
/// built-in defaults.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let path: Option<PathBuf> = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(default_config_path()).filter(|p| p.is_file()),
    };

    debug!(path = ?path, "resolving configuration");
    let cfg = load_effective(path.as_deref())?;
    Ok(cfg)
}

/// Scheduler options from config, with CLI flags taking precedence.
fn runtime_options(cfg: &ConfigFile, args: &CliArgs) -> Result<RuntimeOptions> {
    let mut options = cfg.runtime_options();

    if let Some(n) = args.max_workers {
        if n == 0 {
            return Err(DroidError::ConfigError("--max-workers must be >= 1 (got 0)".into()).into());
        }
        options.max_workers = n;
    }

    if let Some(secs) = args.dag_timeout {
        if secs == 0 {
            return Err(DroidError::ConfigError("--dag-timeout must be >= 1 (got 0)".into()).into());
        }
        options.dag_timeout = Duration::from_secs(secs);
    }

    Ok(options)
}

/// Validate the graph and print its execution levels without running it.
fn print_dry_run(tasks: &[TaskDef]) -> Result<()> {
    let graph = TaskGraph::from_defs(tasks).map_err(DroidError::from)?;
    let levels = graph.levels();

    println!("droid-executor dry-run");
    println!("  tasks: {}", graph.len());
    println!("  levels: {}", levels.len());
    println!();

    for (index, level) in levels.iter().enumerate() {
        println!("level {index}:");
        for id in level {
            let deps = graph.dependencies_of(id);
            if deps.is_empty() {
                println!("  - {id}");
            } else {
                println!("  - {id} (after: {})", deps.join(", "));
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
