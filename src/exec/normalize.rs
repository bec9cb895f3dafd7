// src/exec/normalize.rs

//! Turning droid CLI output into the canonical result object.
//!
//! Every executor result has the same shape:
//!
//! ```json
//! {
//!   "status": "success" | "failed" | "timeout" | "error",
//!   "summary": "...",
//!   "files_changed": [{"path": "...", "change_type": "modified", "highlights": []}],
//!   "commands_run": [{"command": "...", "exit_code": 0, "stdout_excerpt": "", "stderr_excerpt": ""}],
//!   "tests": {},
//!   "logs": ["..."],
//!   "issues": [{"type": "error", "description": "...", "suggested_action": "..."}]
//! }
//! ```
//!
//! The CLI itself may print several different JSON shapes (or none at all);
//! all of that variety is absorbed here so the scheduler only ever looks at
//! `status`.

use serde_json::{Map, Value, json};

/// Maximum number of characters kept from stdout/stderr excerpts.
pub const CLIP_LIMIT: usize = 800;

const FALLBACK_SUMMARY: &str = "Execution completed";

/// Trim `text` and keep at most the last `limit` characters.
pub fn clip(text: &str, limit: usize) -> String {
    let text = text.trim();
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}

/// Parse the JSON object printed by the CLI.
///
/// Tries the whole output first, then falls back to the last line that looks
/// like a JSON object (the CLI may print progress lines before the result).
pub fn parse_json(raw: &str) -> Option<Map<String, Value>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Some(map);
    }

    raw.lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{') && line.ends_with('}'))
        .find_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}

/// Build the canonical result from parsed CLI output.
///
/// `data` is `None` when stdout contained no JSON object; the clipped stdout
/// then becomes the summary.
pub fn normalize_output(data: Option<&Map<String, Value>>, stdout: &str) -> Value {
    let clipped = clip(stdout, CLIP_LIMIT);

    let Some(data) = data else {
        let logs: Vec<Value> = if clipped.is_empty() {
            Vec::new()
        } else {
            vec![Value::String(clipped.clone())]
        };
        return base_result("success", non_empty_or(&clipped, FALLBACK_SUMMARY), logs);
    };

    let mut logs = Vec::new();
    let (status, mut summary) = if str_field(data, "type") == Some("result") {
        // Official `droid exec --output-format json` shape.
        let is_error = data.get("is_error").and_then(Value::as_bool).unwrap_or(false)
            || str_field(data, "subtype") == Some("error");

        if let Some(session_id) = str_field(data, "session_id").filter(|s| !s.is_empty()) {
            logs.push(Value::String(format!("session_id: {session_id}")));
        }
        if let Some(duration) = data.get("duration_ms").filter(|d| is_truthy(d)) {
            logs.push(Value::String(format!("duration: {}ms", display_value(duration))));
        }

        let status = if is_error { "failed" } else { "success" };
        (status.to_string(), str_field(data, "result").unwrap_or_default().to_string())
    } else {
        let status = str_field(data, "status")
            .filter(|s| !s.is_empty())
            .unwrap_or("success")
            .to_string();
        let summary = ["summary", "message", "result"]
            .iter()
            .find_map(|key| str_field(data, key).filter(|s| !s.is_empty()))
            .unwrap_or_default()
            .to_string();
        (status, summary)
    };

    if summary.is_empty() {
        summary = non_empty_or(&clipped, FALLBACK_SUMMARY).to_string();
    }

    let mut result = base_result(&status, &summary, logs);

    if let Some(files) = first_non_empty_array(data, &["files_changed", "files", "changes"]) {
        result["files_changed"] = Value::Array(files.iter().map(map_file_change).collect());
    }

    if let Some(commands) = first_non_empty_array(data, &["commands_run", "commands"]) {
        result["commands_run"] = Value::Array(commands.iter().map(map_command).collect());
    }

    result
}

/// Category recorded in the `issues[].type` field of failure results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The task payload was rejected before the CLI ran.
    Validation,
    /// The CLI is missing or exited with a non-zero code.
    Environment,
    /// The per-task timeout elapsed.
    Timeout,
    /// The executor itself failed (error, panic, cancellation).
    Executor,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Validation => "validation_error",
            IssueKind::Environment => "env_issue",
            IssueKind::Timeout => "timeout",
            IssueKind::Executor => "executor_error",
        }
    }
}

/// Result used for failures detected outside the CLI's own output.
pub fn error_result(status: &str, kind: IssueKind, summary: &str) -> Value {
    let mut result = base_result(status, summary, Vec::new());
    result["issues"] = json!([{
        "type": kind.as_str(),
        "description": summary,
        "suggested_action": "Check Droid CLI logs for details.",
    }]);
    result
}

/// Like [`error_result`], but records the command line and the clipped
/// output of the process that failed.
pub fn process_error_result(
    status: &str,
    kind: IssueKind,
    summary: &str,
    command: &[String],
    stdout: &str,
    stderr: &str,
) -> Value {
    let stdout = clip(stdout, CLIP_LIMIT);
    let stderr = clip(stderr, CLIP_LIMIT);

    let mut result = error_result(status, kind, summary);
    result["commands_run"] = json!([{
        "command": command.join(" "),
        "exit_code": Value::Null,
        "stdout_excerpt": stdout,
        "stderr_excerpt": stderr,
    }]);
    result["logs"] = Value::Array(
        [stdout, stderr]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(Value::String)
            .collect(),
    );
    result
}

fn base_result(status: &str, summary: &str, logs: Vec<Value>) -> Value {
    json!({
        "status": status,
        "summary": summary,
        "files_changed": [],
        "commands_run": [],
        "tests": {},
        "logs": logs,
        "issues": [],
    })
}

fn map_file_change(entry: &Value) -> Value {
    let path = match entry {
        Value::String(path) => path.as_str(),
        other => other.get("path").and_then(Value::as_str).unwrap_or(""),
    };
    json!({ "path": path, "change_type": "modified", "highlights": [] })
}

fn map_command(entry: &Value) -> Value {
    let (command, exit_code) = match entry {
        Value::String(command) => (command.as_str(), Value::Null),
        other => (
            other.get("command").and_then(Value::as_str).unwrap_or(""),
            other.get("exit_code").cloned().unwrap_or(Value::Null),
        ),
    };
    json!({
        "command": command,
        "exit_code": exit_code,
        "stdout_excerpt": "",
        "stderr_excerpt": "",
    })
}

fn str_field<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn first_non_empty_array<'a>(data: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| data.get(*key).and_then(Value::as_array).filter(|a| !a.is_empty()))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
