// tests/graph_validation.rs

use std::sync::Arc;

use droid_executor::dag::TaskGraph;
use droid_executor::engine::DagScheduler;
use droid_executor::errors::ValidationError;
use droid_executor::types::RunStatus;
use droid_executor_test_utils::builders::{anonymous, task, task_after};
use droid_executor_test_utils::fake_executor::ScriptedExecutor;
use droid_executor_test_utils::{init_tracing, test_options, with_timeout};
use serde_json::json;

#[test]
fn missing_id_is_reported_with_its_index() {
    let defs = vec![task("a"), anonymous("no id here")];
    let err = TaskGraph::from_defs(&defs).unwrap_err();
    assert_eq!(err, ValidationError::MissingId { index: 1 });
    assert_eq!(err.to_string(), "Task missing 'id' field (task #1)");
}

#[test]
fn empty_id_counts_as_missing() {
    let mut def = task("a");
    def.id = Some(String::new());
    let err = TaskGraph::from_defs(&[def]).unwrap_err();
    assert_eq!(err, ValidationError::MissingId { index: 0 });
}

#[test]
fn duplicate_id_is_rejected() {
    let defs = vec![task("a"), task("b"), task("a")];
    let err = TaskGraph::from_defs(&defs).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateId("a".into()));
    assert_eq!(err.to_string(), "Duplicate task id: 'a'");
}

#[test]
fn unknown_dependency_names_both_tasks() {
    let defs = vec![task("a"), task_after("b", &["ghost"])];
    let err = TaskGraph::from_defs(&defs).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Task 'b' depends on unknown task 'ghost'"
    );
}

#[test]
fn two_task_cycle_is_rejected() {
    let defs = vec![task_after("a", &["b"]), task_after("b", &["a"])];
    let err = TaskGraph::from_defs(&defs).unwrap_err();
    match err {
        ValidationError::Cycle(node) => assert!(node == "a" || node == "b"),
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn self_dependency_is_a_cycle() {
    let defs = vec![task_after("a", &["a"])];
    let err = TaskGraph::from_defs(&defs).unwrap_err();
    assert_eq!(err, ValidationError::Cycle("a".into()));
}

#[test]
fn duplicate_dependencies_are_collapsed() {
    let defs = vec![task("a"), task_after("b", &["a", "a"])];
    let graph = TaskGraph::from_defs(&defs).unwrap();
    assert_eq!(graph.dependencies_of("b"), ["a".to_string()]);
    assert_eq!(graph.dependents_of("a"), ["b".to_string()]);
}

#[test]
fn roots_and_levels_follow_submission_order() {
    let defs = vec![
        task("lint"),
        task("typecheck"),
        task_after("test", &["lint", "typecheck"]),
        task_after("docs", &["lint"]),
        task_after("release", &["test", "docs"]),
    ];
    let graph = TaskGraph::from_defs(&defs).unwrap();

    assert_eq!(graph.roots(), vec!["lint", "typecheck"]);
    assert_eq!(
        graph.levels(),
        vec![
            vec!["lint".to_string(), "typecheck".to_string()],
            vec!["test".to_string(), "docs".to_string()],
            vec!["release".to_string()],
        ]
    );
}

#[tokio::test]
async fn rejected_submission_runs_nothing() {
    init_tracing();

    let executor = Arc::new(ScriptedExecutor::new());
    let scheduler = DagScheduler::new(executor.clone(), test_options(4));

    let defs = vec![
        task("independent"),
        task_after("a", &["b"]),
        task_after("b", &["a"]),
    ];
    let result = with_timeout(scheduler.submit(defs, json!({}))).await;

    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.results.is_empty());
    assert!(result.skipped.is_empty());
    assert!(result.failed.is_empty());
    let error = result.error.expect("validation error message");
    assert!(error.contains("cycle"), "unexpected error: {error}");
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn empty_submission_completes_immediately() {
    let executor = Arc::new(ScriptedExecutor::new());
    let scheduler = DagScheduler::new(executor.clone(), test_options(4));

    let result = with_timeout(scheduler.submit(Vec::new(), json!({}))).await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.duration_ms, 0);
    assert!(result.results.is_empty());
    assert!(result.skipped.is_empty());
    assert!(result.failed.is_empty());
    assert!(result.error.is_none());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn duplicate_id_rejects_whole_submission() {
    let executor = Arc::new(ScriptedExecutor::new());
    let scheduler = DagScheduler::new(executor.clone(), test_options(4));

    let defs = vec![task("build"), task("test"), task("build")];
    let result = with_timeout(scheduler.submit(defs, json!({}))).await;

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("Duplicate task id: 'build'"));
    assert!(result.results.is_empty());
    assert!(result.skipped.is_empty());
    assert!(result.failed.is_empty());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn unknown_dependency_rejects_whole_submission() {
    let executor = Arc::new(ScriptedExecutor::new());
    let scheduler = DagScheduler::new(executor.clone(), test_options(4));

    let defs = vec![task("build"), task_after("deploy", &["build", "approve"])];
    let result = with_timeout(scheduler.submit(defs, json!({}))).await;

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(
        result.error.as_deref(),
        Some("Task 'deploy' depends on unknown task 'approve'")
    );
    assert!(result.results.is_empty());
    assert!(result.skipped.is_empty());
    assert!(result.failed.is_empty());
    assert_eq!(executor.call_count(), 0);
}
