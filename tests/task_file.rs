// tests/task_file.rs

use std::fs;

use droid_executor::errors::DroidError;
use droid_executor::task_file::{TaskFile, load_task_file, parse_task_file};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn bare_array_has_no_context() {
    let file = parse_task_file(
        r#"[
            {"id": "lint", "objective": "Run the linter"},
            {"id": "test", "objective": "Run tests", "depends_on": ["lint"],
             "constraints": ["offline"], "acceptance_criteria": ["green"]}
        ]"#,
    )
    .unwrap();

    assert!(matches!(file, TaskFile::List(_)));
    let (tasks, context) = file.into_parts();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].depends_on, vec!["lint"]);
    assert_eq!(tasks[1].constraints, vec!["offline"]);
    assert!(context.is_null());
}

#[test]
fn document_carries_context() {
    let (tasks, context) = parse_task_file(
        r#"{"tasks": [{"id": "a", "objective": "A"}], "context": {"repo_root": "/srv/app"}}"#,
    )
    .unwrap()
    .into_parts();

    assert_eq!(tasks[0].id.as_deref(), Some("a"));
    assert_eq!(context, json!({"repo_root": "/srv/app"}));
}

#[test]
fn missing_ids_parse_and_fail_later() {
    let (tasks, _) = parse_task_file(r#"[{"objective": "no id"}]"#)
        .unwrap()
        .into_parts();
    assert!(tasks[0].id.is_none());
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = parse_task_file("[{").unwrap_err();
    assert!(matches!(err, DroidError::JsonError(_)), "got {err:?}");
}

#[test]
fn loads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, r#"[{"id": "only", "objective": "x"}]"#).unwrap();

    let (tasks, _) = load_task_file(&path).unwrap().into_parts();
    assert_eq!(tasks.len(), 1);

    let err = load_task_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, DroidError::IoError(_)));
}

#[test]
fn null_lists_mean_empty() {
    let (tasks, _) = parse_task_file(
        r#"[{"id": "a", "objective": "A", "depends_on": null,
             "constraints": null, "acceptance_criteria": null}]"#,
    )
    .unwrap()
    .into_parts();

    assert!(tasks[0].depends_on.is_empty());
    assert!(tasks[0].constraints.is_empty());
    assert!(tasks[0].acceptance_criteria.is_empty());
}
