#![allow(dead_code)]

use droid_executor::config::{ConfigFile, RawConfigFile};
use droid_executor::dag::TaskDef;

/// A task whose objective equals its id.
///
/// [`ScriptedExecutor`](crate::fake_executor::ScriptedExecutor) keys its
/// behaviour on the objective, so this is the usual way to build test tasks.
pub fn task(id: &str) -> TaskDef {
    TaskDef::new(id, id)
}

/// Like [`task`], with dependencies.
pub fn task_after(id: &str, deps: &[&str]) -> TaskDef {
    deps.iter().fold(task(id), |def, dep| def.after(*dep))
}

/// A linear chain `ids[0] -> ids[1] -> ...`.
pub fn chain(ids: &[&str]) -> Vec<TaskDef> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            if i == 0 {
                task(id)
            } else {
                task_after(id, &[ids[i - 1]])
            }
        })
        .collect()
}

/// A task without an id, for validation tests.
pub fn anonymous(objective: &str) -> TaskDef {
    TaskDef {
        id: None,
        objective: objective.to_string(),
        ..TaskDef::default()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.scheduler.max_workers = n;
        self
    }

    pub fn dag_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scheduler.dag_timeout_secs = secs;
        self
    }

    pub fn cli_cmd(mut self, cmd: &str) -> Self {
        self.config.droid.cli_cmd = Some(cmd.to_string());
        self
    }

    pub fn task_timeout_secs(mut self, secs: u64) -> Self {
        self.config.droid.timeout_secs = secs;
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.droid.model = Some(model.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
