// src/exec/prompt.rs

//! Prompt construction for the droid CLI.

use serde_json::{Map, Value};

use super::TaskPayload;

const DEFAULT_OBJECTIVE: &str = "Execute the described task.";

const AGENT_DIRECTIVE: &str = "Act as an implementation-focused coding agent. \
Execute the necessary edits and commands in the current repository to satisfy the objective \
and acceptance criteria. Return a concise JSON summary of what you did.";

/// Normalize the shared context: a bare string is treated as
/// `{"summary": <string>}`, anything that isn't an object as empty.
pub fn context_map(context: &Value) -> Map<String, Value> {
    match context {
        Value::Object(map) => map.clone(),
        Value::String(summary) => {
            let mut map = Map::new();
            map.insert("summary".to_string(), Value::String(summary.clone()));
            map
        }
        _ => Map::new(),
    }
}

/// `context.repo_root`, if present.
pub fn repo_root(context: &Value) -> Option<String> {
    context_map(context)
        .get("repo_root")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build the prompt handed to `droid exec`.
pub fn build_prompt(payload: &TaskPayload) -> String {
    let objective = if payload.objective.trim().is_empty() {
        DEFAULT_OBJECTIVE
    } else {
        payload.objective.as_str()
    };

    let ctx = context_map(&payload.context);
    let files: Vec<&str> = ctx
        .get("files_of_interest")
        .and_then(Value::as_array)
        .map(|files| files.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut parts = vec![format!("Objective: {objective}")];
    if !payload.instructions.is_empty() {
        parts.push(format!("Instructions: {}", payload.instructions));
    }
    if !files.is_empty() {
        parts.push(format!("Relevant files: {}", files.join(", ")));
    }
    if !payload.constraints.is_empty() {
        parts.push(format!("Constraints: {}", payload.constraints.join("; ")));
    }
    if !payload.acceptance_criteria.is_empty() {
        parts.push(format!(
            "Acceptance criteria: {}",
            payload.acceptance_criteria.join("; ")
        ));
    }

    parts.push(String::new());
    parts.push(AGENT_DIRECTIVE.to_string());

    parts.join("\n")
}
