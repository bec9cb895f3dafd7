// tests/config_loading.rs

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use droid_executor::config::{
    ConfigFile, RawConfigFile, apply_env_overrides, load_and_validate, load_effective,
};
use droid_executor::errors::DroidError;
use droid_executor_test_utils::builders::ConfigFileBuilder;
use tempfile::tempdir;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults_without_a_file() {
    let cfg = ConfigFileBuilder::new().build();

    assert_eq!(cfg.scheduler.max_workers, 8);
    assert_eq!(cfg.scheduler.dag_timeout_secs, 3600);
    assert_eq!(cfg.droid.auto_level, "high");
    assert_eq!(cfg.droid.enabled_tools, "LS,Read,Glob,Grep,Edit,Create,Execute");
    assert_eq!(cfg.droid.timeout(), Duration::from_secs(1800));
    assert!(cfg.droid.cli_cmd.is_none());

    let options = cfg.runtime_options();
    assert_eq!(options.max_workers, 8);
    assert_eq!(options.dag_timeout, Duration::from_secs(3600));
}

#[test]
fn loads_partial_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("droid.toml");
    fs::write(
        &path,
        r#"
[scheduler]
max_workers = 3

[droid]
model = "custom:glm-4"
reasoning_effort = "high"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.scheduler.max_workers, 3);
    assert_eq!(cfg.scheduler.dag_timeout_secs, 3600);
    assert_eq!(cfg.droid.model.as_deref(), Some("custom:glm-4"));
    assert_eq!(cfg.droid.reasoning_effort.as_deref(), Some("high"));
    assert_eq!(cfg.droid.auto_level, "high");
}

#[test]
fn invalid_toml_is_a_toml_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("droid.toml");
    fs::write(&path, "[scheduler\nmax_workers = ").unwrap();

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, DroidError::TomlError(_)), "got {err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = load_effective(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, DroidError::IoError(_)), "got {err:?}");
}

#[test]
fn zero_limits_are_rejected() {
    let err = ConfigFile::try_from(ConfigFileBuilder::new().max_workers(0).raw()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: [scheduler].max_workers must be >= 1 (got 0)"
    );

    let err = ConfigFile::try_from(ConfigFileBuilder::new().dag_timeout_secs(0).raw()).unwrap_err();
    assert!(err.to_string().contains("dag_timeout_secs"));

    let err = ConfigFile::try_from(ConfigFileBuilder::new().task_timeout_secs(0).raw()).unwrap_err();
    assert!(err.to_string().contains("[droid].timeout_secs"));
}

#[test]
fn blank_cli_cmd_is_rejected() {
    let err = ConfigFile::try_from(ConfigFileBuilder::new().cli_cmd("   ").raw()).unwrap_err();
    assert!(err.to_string().contains("cli_cmd"));
}

#[test]
fn env_overrides_apply_on_top_of_file_values() {
    let mut raw = ConfigFileBuilder::new().max_workers(2).raw();
    let vars = env(&[
        ("DROID_MAX_WORKERS", "5"),
        ("DROID_DAG_TIMEOUT", "60"),
        ("DROID_CLI_CMD", "my-droid exec --auto low"),
        ("DROID_MODEL", "custom:model"),
        ("DROID_TIMEOUT", "90"),
        ("DROID_AUTO_LEVEL", ""),
    ]);

    apply_env_overrides(&mut raw, |k| vars.get(k).cloned()).unwrap();
    let cfg = ConfigFile::try_from(raw).unwrap();

    assert_eq!(cfg.scheduler.max_workers, 5);
    assert_eq!(cfg.scheduler.dag_timeout_secs, 60);
    assert_eq!(cfg.droid.cli_cmd.as_deref(), Some("my-droid exec --auto low"));
    assert_eq!(cfg.droid.model.as_deref(), Some("custom:model"));
    assert_eq!(cfg.droid.timeout_secs, 90);
    // Blank values are ignored.
    assert_eq!(cfg.droid.auto_level, "high");
}

#[test]
fn unparsable_env_value_is_a_config_error() {
    let mut raw = RawConfigFile::default();
    let vars = env(&[("DROID_TIMEOUT", "half an hour")]);

    let err = apply_env_overrides(&mut raw, |k| vars.get(k).cloned()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: environment variable DROID_TIMEOUT must be a non-negative integer (got 'half an hour')"
    );
}
