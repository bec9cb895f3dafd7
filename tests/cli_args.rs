// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use droid_executor::cli::{CliArgs, LogLevel};
use droid_executor::logging::resolve_level;
use droid_executor::single_payload;
use serde_json::json;
use tracing::Level;

#[test]
fn parses_all_flags() {
    let args = CliArgs::try_parse_from([
        "droid-executor",
        "--tasks",
        "plan.json",
        "--config",
        "conf/droid.toml",
        "--max-workers",
        "3",
        "--dag-timeout",
        "120",
        "--dry-run",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.tasks, Some(PathBuf::from("plan.json")));
    assert!(args.objective.is_none());
    assert_eq!(args.config, Some(PathBuf::from("conf/droid.toml")));
    assert_eq!(args.max_workers, Some(3));
    assert_eq!(args.dag_timeout, Some(120));
    assert!(args.dry_run);
    assert_eq!(args.log_level, Some(LogLevel::Debug));
}

#[test]
fn tasks_or_objective_is_required() {
    assert!(CliArgs::try_parse_from(["droid-executor"]).is_err());
    assert!(CliArgs::try_parse_from(["droid-executor", "--dry-run"]).is_err());

    let args = CliArgs::try_parse_from(["droid-executor", "--tasks", "t.json"]).unwrap();
    assert!(args.config.is_none());
    assert!(!args.dry_run);
}

#[test]
fn objective_runs_a_single_task() {
    let args = CliArgs::try_parse_from([
        "droid-executor",
        "--objective",
        "Add a health endpoint",
        "--instructions",
        "Use the existing router",
        "--repo-root",
        "/srv/app",
    ])
    .unwrap();

    assert!(args.tasks.is_none());
    let payload = single_payload(&args);
    assert_eq!(payload.objective, "Add a health endpoint");
    assert_eq!(payload.instructions, "Use the existing router");
    assert_eq!(payload.context, json!({ "repo_root": "/srv/app" }));
    assert!(payload.constraints.is_empty());
}

#[test]
fn objective_without_repo_root_has_empty_context() {
    let args = CliArgs::try_parse_from(["droid-executor", "--objective", "Fix the build"]).unwrap();
    let payload = single_payload(&args);
    assert_eq!(payload.instructions, "");
    assert_eq!(payload.context, json!({}));
}

#[test]
fn tasks_and_objective_conflict() {
    let err = CliArgs::try_parse_from([
        "droid-executor",
        "--tasks",
        "t.json",
        "--objective",
        "Fix the build",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn single_task_flags_need_objective() {
    assert!(
        CliArgs::try_parse_from(["droid-executor", "--tasks", "t.json", "--repo-root", "/srv/app"])
            .is_err()
    );
    assert!(
        CliArgs::try_parse_from(["droid-executor", "--tasks", "t.json", "--instructions", "x"])
            .is_err()
    );
}

#[test]
fn log_level_precedence() {
    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace")), Level::WARN);
    assert_eq!(resolve_level(None, Some("DEBUG")), Level::DEBUG);
    assert_eq!(resolve_level(None, Some("warning")), Level::WARN);
    assert_eq!(resolve_level(None, Some("loud")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
}
