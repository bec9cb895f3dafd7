// src/task_file.rs

//! Reading task graphs from JSON files.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::dag::TaskDef;
use crate::errors::Result;

/// Accepted top-level shapes of a tasks file.
///
/// ```json
/// [{"id": "lint", "objective": "Run the linter"}]
/// ```
///
/// or
///
/// ```json
/// {"tasks": [{"id": "lint", "objective": "Run the linter"}], "context": {"repo_root": "."}}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskFile {
    List(Vec<TaskDef>),
    Document {
        tasks: Vec<TaskDef>,
        #[serde(default)]
        context: Value,
    },
}

impl TaskFile {
    /// Split into the task list and the shared context. A missing context is
    /// `null`; [`execute_dag`](crate::engine::execute_dag) turns that into `{}`.
    pub fn into_parts(self) -> (Vec<TaskDef>, Value) {
        match self {
            TaskFile::List(tasks) => (tasks, Value::Null),
            TaskFile::Document { tasks, context } => (tasks, context),
        }
    }
}

pub fn parse_task_file(contents: &str) -> Result<TaskFile> {
    Ok(serde_json::from_str(contents)?)
}

pub fn load_task_file(path: impl AsRef<Path>) -> Result<TaskFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_task_file(&contents)
}
