// src/dag/task_info.rs

//! Task definitions as submitted, and per-run task state.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::engine::TaskName;
use crate::exec::TaskPayload;
use crate::types::TaskStatus;

/// A task as submitted by the caller.
///
/// `id` is optional at the serde level so that a missing id surfaces as a
/// structural validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub constraints: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub acceptance_criteria: Vec<String>,
}

impl TaskDef {
    /// Convenience constructor used heavily in tests and examples.
    pub fn new(id: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            objective: objective.into(),
            ..Self::default()
        }
    }

    pub fn after(mut self, dep: impl Into<String>) -> Self {
        self.depends_on.push(dep.into());
        self
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Static task information plus per-run state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub id: TaskName,
    pub objective: String,
    pub instructions: String,
    /// Direct dependencies, de-duplicated, in declaration order.
    pub deps: Vec<TaskName>,
    pub constraints: Vec<String>,
    pub acceptance_criteria: Vec<String>,

    pub status: TaskStatus,

    /// Executor result, once the task has run.
    pub result: Option<Value>,
}

impl TaskInfo {
    pub fn from_def(id: TaskName, def: &TaskDef, deps: Vec<TaskName>) -> Self {
        Self {
            id,
            objective: def.objective.clone(),
            instructions: def.instructions.clone().unwrap_or_default(),
            deps,
            constraints: def.constraints.clone(),
            acceptance_criteria: def.acceptance_criteria.clone(),
            status: TaskStatus::Pending,
            result: None,
        }
    }

    /// Build the executor payload for this task.
    pub fn payload(&self, context: &Value) -> TaskPayload {
        TaskPayload {
            objective: self.objective.clone(),
            instructions: self.instructions.clone(),
            context: context.clone(),
            constraints: self.constraints.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
        }
    }

    /// The executor result, or a `{status: <state>}` placeholder if the task
    /// never produced one.
    pub fn result_or_placeholder(&self) -> Value {
        match &self.result {
            Some(result) => result.clone(),
            None => serde_json::json!({ "status": self.status.as_str() }),
        }
    }
}
