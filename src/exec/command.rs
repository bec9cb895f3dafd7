// src/exec/command.rs

//! `Executor` backed by the `droid exec` CLI.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::DroidSection;
use crate::exec::backend::{ExecuteFuture, Executor, TaskPayload};
use crate::exec::normalize::{IssueKind, error_result, normalize_output, parse_json, process_error_result};
use crate::exec::prompt::{build_prompt, repo_root};
use crate::exec::session::SessionTracker;

/// Longest objective accepted, in characters.
pub const MAX_OBJECTIVE_CHARS: usize = 50_000;

/// Longest instructions accepted, in characters.
pub const MAX_INSTRUCTIONS_CHARS: usize = 100_000;

/// Runs each task as one `droid exec` subprocess.
///
/// The executor is shared by all workers of a run; the only mutable state is
/// the session tracker, which has its own lock.
#[derive(Debug)]
pub struct DroidExecutor {
    settings: DroidSection,
    sessions: SessionTracker,
}

impl DroidExecutor {
    pub fn new(settings: DroidSection) -> Self {
        Self {
            settings,
            sessions: SessionTracker::new(),
        }
    }

    pub fn settings(&self) -> &DroidSection {
        &self.settings
    }

    /// Session id reported by the most recent call that produced one.
    pub fn last_session_id(&self) -> Option<String> {
        self.sessions.last()
    }

    /// The base command line, without the prompt.
    pub fn base_command(&self) -> Vec<String> {
        if let Some(cmd) = &self.settings.cli_cmd {
            return cmd.split_whitespace().map(str::to_string).collect();
        }

        let mut args: Vec<String> = [
            "droid",
            "exec",
            "--output-format",
            "json",
            "--auto",
            self.settings.auto_level.as_str(),
            "--enabled-tools",
            self.settings.enabled_tools.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(model) = self.settings.model.as_deref().filter(|m| !m.is_empty()) {
            args.push("-m".to_string());
            args.push(model.to_string());
        }
        if let Some(effort) = self
            .settings
            .reasoning_effort
            .as_deref()
            .filter(|e| !e.is_empty())
        {
            args.push("--reasoning-effort".to_string());
            args.push(effort.to_string());
        }

        args
    }

    /// Validate, run and normalize one task. Always returns a result object.
    pub async fn run(&self, payload: TaskPayload) -> Value {
        if let Some(rejection) = check_payload(&payload) {
            return rejection;
        }

        let mut command = self.base_command();
        command.push(build_prompt(&payload));
        let cwd = repo_root(&payload.context).unwrap_or_else(|| ".".to_string());
        let limit = self.settings.timeout();

        info!(
            program = %command[0],
            cwd = %cwd,
            prompt_chars = command.last().map(|p| p.chars().count()).unwrap_or(0),
            timeout_secs = limit.as_secs(),
            "running droid"
        );

        // A missing working directory also makes spawn fail with NotFound;
        // report it before it can be mistaken for a missing binary.
        if !is_dir(&cwd).await {
            error!(repo_root = %cwd, "repo_root is not a directory");
            return process_error_result(
                "error",
                IssueKind::Environment,
                &format!("Repository root '{cwd}' does not exist or is not a directory."),
                &command,
                "",
                "",
            );
        }

        let started = Instant::now();
        match run_process(&command, &cwd, limit).await {
            Ok(ProcessOutcome::Finished { code, stdout, stderr }) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, code, "droid exited");
                if code != 0 {
                    error!(code, stderr = %stderr.trim(), "droid CLI failed");
                    return process_error_result(
                        "failed",
                        IssueKind::Environment,
                        &format!("Droid CLI failed with code {code}"),
                        &command,
                        &stdout,
                        &stderr,
                    );
                }

                let parsed = parse_json(&stdout);
                if parsed.is_none() {
                    warn!("could not parse droid output as JSON; using raw text");
                }
                self.sessions.observe(parsed.as_ref(), &stdout, &stderr);
                normalize_output(parsed.as_ref(), &stdout)
            }
            Ok(ProcessOutcome::TimedOut) => {
                error!(
                    limit_secs = limit.as_secs(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "droid execution timed out"
                );
                process_error_result(
                    "timeout",
                    IssueKind::Timeout,
                    &format!(
                        "Droid execution timed out after {}s. The task may be too large; consider splitting it into smaller subtasks.",
                        limit.as_secs()
                    ),
                    &command,
                    "",
                    "",
                )
            }
            Ok(ProcessOutcome::NotFound) => {
                error!(program = %command[0], "droid CLI not found");
                process_error_result(
                    "error",
                    IssueKind::Environment,
                    "Droid CLI not found. Please install droid or set DROID_CLI_CMD.",
                    &command,
                    "",
                    "",
                )
            }
            Err(err) => {
                error!(error = %err, "error executing droid");
                process_error_result(
                    "failed",
                    IssueKind::Executor,
                    &format!("{err:#}"),
                    &command,
                    "",
                    "",
                )
            }
        }
    }
}

impl Executor for DroidExecutor {
    fn execute(&self, payload: TaskPayload) -> ExecuteFuture<'_> {
        Box::pin(async move { Ok::<_, anyhow::Error>(self.run(payload).await) })
    }
}

enum ProcessOutcome {
    Finished {
        code: i32,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    NotFound,
}

async fn run_process(command: &[String], cwd: &str, limit: Duration) -> Result<ProcessOutcome> {
    let Some((program, args)) = command.split_first() else {
        anyhow::bail!("empty droid command line");
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ProcessOutcome::NotFound),
        Err(err) => {
            return Err(err).with_context(|| format!("spawning droid process '{program}' in '{cwd}'"));
        }
    };

    // Dropping the output future on timeout drops the child, which kills it.
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(output) => output.with_context(|| format!("waiting for droid process '{program}'"))?,
        Err(_) => return Ok(ProcessOutcome::TimedOut),
    };

    Ok(ProcessOutcome::Finished {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

async fn is_dir(path: &str) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

fn check_payload(payload: &TaskPayload) -> Option<Value> {
    let objective = payload.objective.trim();
    if objective.is_empty() {
        warn!("rejected task: empty objective");
        return Some(error_result(
            "error",
            IssueKind::Validation,
            "Objective must not be empty. Provide a clear task objective.",
        ));
    }

    let objective_chars = objective.chars().count();
    if objective_chars > MAX_OBJECTIVE_CHARS {
        warn!(chars = objective_chars, "rejected task: objective too long");
        return Some(error_result(
            "error",
            IssueKind::Validation,
            &format!(
                "Objective is too long ({objective_chars} chars); limit is {MAX_OBJECTIVE_CHARS}."
            ),
        ));
    }

    let instruction_chars = payload.instructions.chars().count();
    if instruction_chars > MAX_INSTRUCTIONS_CHARS {
        warn!(chars = instruction_chars, "rejected task: instructions too long");
        return Some(error_result(
            "error",
            IssueKind::Validation,
            &format!(
                "Instructions are too long ({instruction_chars} chars); limit is {MAX_INSTRUCTIONS_CHARS}."
            ),
        ));
    }

    None
}
