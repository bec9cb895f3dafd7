// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DroidError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DroidError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.scheduler, raw.droid))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scheduler(cfg)?;
    validate_droid(cfg)?;
    Ok(())
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scheduler.max_workers == 0 {
        return Err(DroidError::ConfigError(
            "[scheduler].max_workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.scheduler.dag_timeout_secs == 0 {
        return Err(DroidError::ConfigError(
            "[scheduler].dag_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_droid(cfg: &RawConfigFile) -> Result<()> {
    let droid = &cfg.droid;

    if droid.timeout_secs == 0 {
        return Err(DroidError::ConfigError(
            "[droid].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(cmd) = &droid.cli_cmd {
        if cmd.trim().is_empty() {
            return Err(DroidError::ConfigError(
                "[droid].cli_cmd must not be empty when set".to_string(),
            ));
        }
    } else {
        // Only relevant when we assemble the command ourselves.
        if droid.auto_level.trim().is_empty() {
            return Err(DroidError::ConfigError(
                "[droid].auto_level must not be empty".to_string(),
            ));
        }
        if droid.enabled_tools.trim().is_empty() {
            return Err(DroidError::ConfigError(
                "[droid].enabled_tools must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}
