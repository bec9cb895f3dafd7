// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::{DEFAULT_DAG_TIMEOUT, DEFAULT_MAX_WORKERS, RuntimeOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [scheduler]
/// max_workers = 8
/// dag_timeout_secs = 3600
///
/// [droid]
/// auto_level = "high"
/// enabled_tools = "LS,Read,Glob,Grep,Edit,Create,Execute"
/// model = "custom:my-model"
/// timeout_secs = 1800
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw
/// shape; use [`ConfigFile`] (via `TryFrom`) once it has been validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// DAG scheduling limits from `[scheduler]`.
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// How to invoke the droid CLI, from `[droid]`.
    #[serde(default)]
    pub droid: DroidSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub scheduler: SchedulerSection,
    pub droid: DroidSection,
}

impl ConfigFile {
    /// Construct without validation. Callers must have validated `scheduler`
    /// and `droid` already.
    pub(crate) fn new_unchecked(scheduler: SchedulerSection, droid: DroidSection) -> Self {
        Self { scheduler, droid }
    }

    /// Scheduler options derived from `[scheduler]`.
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            max_workers: self.scheduler.max_workers,
            dag_timeout: Duration::from_secs(self.scheduler.dag_timeout_secs),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerSection {
    /// Upper bound on tasks running at the same time.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Whole-graph deadline in seconds.
    #[serde(default = "default_dag_timeout_secs")]
    pub dag_timeout_secs: u64,
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_dag_timeout_secs() -> u64 {
    DEFAULT_DAG_TIMEOUT.as_secs()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            dag_timeout_secs: default_dag_timeout_secs(),
        }
    }
}

/// `[droid]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DroidSection {
    /// Full command override, split on whitespace (e.g. `"droid exec --auto low"`).
    ///
    /// When set, `enabled_tools`, `auto_level`, `model` and `reasoning_effort`
    /// are ignored.
    #[serde(default)]
    pub cli_cmd: Option<String>,

    /// Value passed to `--enabled-tools`.
    #[serde(default = "default_enabled_tools")]
    pub enabled_tools: String,

    /// Value passed to `--auto`.
    #[serde(default = "default_auto_level")]
    pub auto_level: String,

    /// Optional `-m <model>`.
    #[serde(default)]
    pub model: Option<String>,

    /// Optional `--reasoning-effort <effort>`.
    #[serde(default)]
    pub reasoning_effort: Option<String>,

    /// Per-task timeout in seconds.
    #[serde(default = "default_task_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled_tools() -> String {
    "LS,Read,Glob,Grep,Edit,Create,Execute".to_string()
}

fn default_auto_level() -> String {
    "high".to_string()
}

fn default_task_timeout_secs() -> u64 {
    1800
}

impl Default for DroidSection {
    fn default() -> Self {
        Self {
            cli_cmd: None,
            enabled_tools: default_enabled_tools(),
            auto_level: default_auto_level(),
            model: None,
            reasoning_effort: None,
            timeout_secs: default_task_timeout_secs(),
        }
    }
}

impl DroidSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
