// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DroidError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// Environment variables are **not** consulted; see [`load_effective`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration the binary actually runs with.
///
/// 1. the TOML file at `path`, or defaults if `path` is `None`
/// 2. `DROID_*` environment overrides on top
/// 3. validation
pub fn load_effective(path: Option<&Path>) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            load_from_path(path)?
        }
        None => RawConfigFile::default(),
    };

    apply_env_overrides(&mut raw, |key| std::env::var(key).ok())?;
    ConfigFile::try_from(raw)
}

/// Apply `DROID_*` overrides using `lookup` to read variables.
///
/// `lookup` is injected so tests don't have to mutate the process
/// environment.
///
/// | variable                 | field                        |
/// |--------------------------|------------------------------|
/// | `DROID_MAX_WORKERS`      | `scheduler.max_workers`      |
/// | `DROID_DAG_TIMEOUT`      | `scheduler.dag_timeout_secs` |
/// | `DROID_CLI_CMD`          | `droid.cli_cmd`              |
/// | `DROID_ENABLED_TOOLS`    | `droid.enabled_tools`        |
/// | `DROID_AUTO_LEVEL`       | `droid.auto_level`           |
/// | `DROID_MODEL`            | `droid.model`                |
/// | `DROID_REASONING_EFFORT` | `droid.reasoning_effort`     |
/// | `DROID_TIMEOUT`          | `droid.timeout_secs`         |
pub fn apply_env_overrides<F>(raw: &mut RawConfigFile, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("DROID_MAX_WORKERS") {
        raw.scheduler.max_workers = parse_env("DROID_MAX_WORKERS", &v)?;
    }
    if let Some(v) = get("DROID_DAG_TIMEOUT") {
        raw.scheduler.dag_timeout_secs = parse_env("DROID_DAG_TIMEOUT", &v)?;
    }
    if let Some(v) = get("DROID_CLI_CMD") {
        raw.droid.cli_cmd = Some(v);
    }
    if let Some(v) = get("DROID_ENABLED_TOOLS") {
        raw.droid.enabled_tools = v;
    }
    if let Some(v) = get("DROID_AUTO_LEVEL") {
        raw.droid.auto_level = v;
    }
    if let Some(v) = get("DROID_MODEL") {
        raw.droid.model = Some(v);
    }
    if let Some(v) = get("DROID_REASONING_EFFORT") {
        raw.droid.reasoning_effort = Some(v);
    }
    if let Some(v) = get("DROID_TIMEOUT") {
        raw.droid.timeout_secs = parse_env("DROID_TIMEOUT", &v)?;
    }

    Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DroidError::ConfigError(format!(
            "environment variable {key} must be a non-negative integer (got '{value}')"
        ))
    })
}

/// Default config location: `droid.toml` in the current working directory.
///
/// The binary only uses it when the file exists.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("droid.toml")
}
