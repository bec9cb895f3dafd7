// tests/droid_output.rs

//! Prompt building, output normalization and session tracking for the droid
//! CLI, without spawning any process.

use droid_executor::exec::normalize::{CLIP_LIMIT, clip};
use droid_executor::exec::{
    IssueKind, SessionTracker, TaskPayload, build_prompt, error_result, normalize_output,
    parse_json, process_error_result,
};
use serde_json::json;

#[test]
fn prompt_lists_every_section_in_order() {
    let payload = TaskPayload {
        objective: "Add a health endpoint".into(),
        instructions: "Use the existing router".into(),
        context: json!({"files_of_interest": ["src/server.rs", "src/routes.rs"]}),
        constraints: vec!["no new dependencies".into(), "keep API stable".into()],
        acceptance_criteria: vec!["GET /health returns 200".into()],
    };

    let prompt = build_prompt(&payload);
    let lines: Vec<&str> = prompt.lines().collect();

    assert_eq!(lines[0], "Objective: Add a health endpoint");
    assert_eq!(lines[1], "Instructions: Use the existing router");
    assert_eq!(lines[2], "Relevant files: src/server.rs, src/routes.rs");
    assert_eq!(lines[3], "Constraints: no new dependencies; keep API stable");
    assert_eq!(lines[4], "Acceptance criteria: GET /health returns 200");
    assert_eq!(lines[5], "");
    assert!(lines[6].starts_with("Act as an implementation-focused coding agent."));
    assert!(lines[6].ends_with("Return a concise JSON summary of what you did."));
}

#[test]
fn prompt_omits_empty_sections_and_accepts_string_context() {
    let payload = TaskPayload {
        objective: "Fix the build".into(),
        context: json!("the CI is red"),
        ..TaskPayload::default()
    };

    let prompt = build_prompt(&payload);
    assert!(prompt.starts_with("Objective: Fix the build\n\nAct as"));
    assert!(!prompt.contains("Relevant files"));
    assert!(!prompt.contains("Constraints"));
}

#[test]
fn clip_keeps_the_tail() {
    assert_eq!(clip("  short  ", 10), "short");
    assert_eq!(clip("abcdefghij", 4), "ghij");

    let long = "é".repeat(CLIP_LIMIT + 10);
    assert_eq!(clip(&long, CLIP_LIMIT).chars().count(), CLIP_LIMIT);
}

#[test]
fn parse_json_falls_back_to_last_object_line() {
    assert!(parse_json("").is_none());
    assert!(parse_json("plain text only").is_none());

    let whole = parse_json(r#"{"status": "success"}"#).unwrap();
    assert_eq!(whole["status"], "success");

    let noisy = "spinner...\n{\"first\": 1}\nworking\n{\"status\": \"failed\"}\n";
    let parsed = parse_json(noisy).unwrap();
    assert_eq!(parsed["status"], "failed");
}

#[test]
fn official_result_shape_is_normalized() {
    let data = parse_json(
        r#"{"type": "result", "subtype": "success", "is_error": false,
            "result": "Added endpoint", "session_id": "abc-123", "duration_ms": 4200}"#,
    )
    .unwrap();

    let result = normalize_output(Some(&data), "");
    assert_eq!(result["status"], "success");
    assert_eq!(result["summary"], "Added endpoint");
    assert_eq!(result["logs"], json!(["session_id: abc-123", "duration: 4200ms"]));
    assert_eq!(result["files_changed"], json!([]));
    assert_eq!(result["tests"], json!({}));
}

#[test]
fn official_error_shape_is_failed() {
    let data = parse_json(r#"{"type": "result", "is_error": true, "result": "could not edit"}"#).unwrap();
    assert_eq!(normalize_output(Some(&data), "")["status"], "failed");

    let data = parse_json(r#"{"type": "result", "subtype": "error"}"#).unwrap();
    let result = normalize_output(Some(&data), "raw stdout");
    assert_eq!(result["status"], "failed");
    assert_eq!(result["summary"], "raw stdout");
}

#[test]
fn legacy_shape_maps_files_and_commands() {
    let data = parse_json(
        r#"{"status": "success", "message": "done",
            "files": ["a.rs", {"path": "b.rs"}],
            "commands": ["cargo fmt", {"command": "cargo test", "exit_code": 0}]}"#,
    )
    .unwrap();

    let result = normalize_output(Some(&data), "");
    assert_eq!(result["summary"], "done");
    assert_eq!(
        result["files_changed"],
        json!([
            {"path": "a.rs", "change_type": "modified", "highlights": []},
            {"path": "b.rs", "change_type": "modified", "highlights": []},
        ])
    );
    assert_eq!(result["commands_run"][0]["command"], "cargo fmt");
    assert_eq!(result["commands_run"][0]["exit_code"], json!(null));
    assert_eq!(result["commands_run"][1]["exit_code"], 0);
}

#[test]
fn legacy_status_is_passed_through() {
    let data = parse_json(r#"{"status": "failed", "summary": "tests failed"}"#).unwrap();
    let result = normalize_output(Some(&data), "");
    assert_eq!(result["status"], "failed");
    assert_eq!(result["summary"], "tests failed");
}

#[test]
fn non_json_output_becomes_summary() {
    let result = normalize_output(None, "  All done, edited 2 files  ");
    assert_eq!(result["status"], "success");
    assert_eq!(result["summary"], "All done, edited 2 files");
    assert_eq!(result["logs"], json!(["All done, edited 2 files"]));

    let result = normalize_output(None, "");
    assert_eq!(result["summary"], "Execution completed");
    assert_eq!(result["logs"], json!([]));
}

#[test]
fn error_results_carry_an_issue() {
    let result = error_result("error", IssueKind::Validation, "Objective must not be empty.");
    assert_eq!(result["status"], "error");
    assert_eq!(result["issues"][0]["type"], "validation_error");
    assert_eq!(result["issues"][0]["description"], "Objective must not be empty.");

    let command = vec!["droid".to_string(), "exec".to_string()];
    let result = process_error_result(
        "failed",
        IssueKind::Environment,
        "Droid CLI failed with code 2",
        &command,
        "partial output",
        "fatal: bad flag",
    );
    assert_eq!(result["commands_run"][0]["command"], "droid exec");
    assert_eq!(result["commands_run"][0]["stderr_excerpt"], "fatal: bad flag");
    assert_eq!(result["logs"], json!(["partial output", "fatal: bad flag"]));
    assert_eq!(result["issues"][0]["type"], "env_issue");
}

#[test]
fn session_tracker_prefers_json_then_text() {
    let tracker = SessionTracker::new();
    assert_eq!(tracker.last(), None);

    let data = parse_json(r#"{"session_id": "0f3a-77"}"#).unwrap();
    assert_eq!(
        tracker.observe(Some(&data), "Session ID: ffff", ""),
        Some("0f3a-77".to_string())
    );
    assert_eq!(tracker.last().as_deref(), Some("0f3a-77"));

    assert_eq!(
        tracker.observe(None, "", "info: Session ID: 12ab-cd34"),
        Some("12ab-cd34".to_string())
    );
    assert_eq!(
        tracker.observe(None, "session_id: beef", ""),
        Some("beef".to_string())
    );

    // Nothing found: the previous id is kept.
    assert_eq!(tracker.observe(None, "no ids here", ""), None);
    assert_eq!(tracker.last().as_deref(), Some("beef"));
}
