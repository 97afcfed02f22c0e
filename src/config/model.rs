// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::{ReapError, Result};
use crate::exec::{CommandSpec, ProcessRequest, RunnerOptions};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// tick = "100ms"
/// timeout = "10s"
/// grace_ticks = 5
///
/// [operation.umount]
/// argv = ["umount", "/mnt/ocfs2"]
/// title = "Unmount"
/// desc = "Unmounting"
/// destructive = true
///
/// [operation.nodes]
/// cmd = "o2cb_ctl -I -t node -o"
/// title = "Cluster Control"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Runner tunables from `[config]`.
    #[serde(default)]
    pub config: RunnerSection,

    /// Named operations from `[operation.<name>]`.
    #[serde(default)]
    pub operation: BTreeMap<String, OperationConfig>,
}

/// `[config]` section. Durations are strings like `"100ms"` or `"10s"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSection {
    #[serde(default = "default_tick")]
    pub tick: String,

    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Budget for operations with `spin_now = true`.
    #[serde(default = "default_spin_timeout")]
    pub spin_timeout: String,

    #[serde(default = "default_grace_ticks")]
    pub grace_ticks: u32,

    /// Fraction (0.0 to 1.0) of the budget after which progress is shown.
    #[serde(default = "default_progress_threshold")]
    pub progress_threshold: f64,

    #[serde(default = "default_read_chunk")]
    pub read_chunk: usize,
}

fn default_tick() -> String {
    "100ms".to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

fn default_spin_timeout() -> String {
    "10m".to_string()
}

fn default_grace_ticks() -> u32 {
    5
}

fn default_progress_threshold() -> f64 {
    0.1
}

fn default_read_chunk() -> usize {
    1024
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            timeout: default_timeout(),
            spin_timeout: default_spin_timeout(),
            grace_ticks: default_grace_ticks(),
            progress_threshold: default_progress_threshold(),
            read_chunk: default_read_chunk(),
        }
    }
}

/// `[operation.<name>]` section: a preset request.
///
/// Exactly one of `argv` or `cmd` must be set. `cmd` follows the usual
/// string rule: a single word runs directly, anything else via `sh -c`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationConfig {
    #[serde(default)]
    pub argv: Option<Vec<String>>,

    #[serde(default)]
    pub cmd: Option<String>,

    /// Defaults to the operation name.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub desc: Option<String>,

    /// Show progress immediately and use `spin_timeout`.
    #[serde(default)]
    pub spin_now: bool,

    /// Killing this operation may leave the system inconsistent
    /// (mount, umount, format).
    #[serde(default)]
    pub destructive: bool,
}

impl OperationConfig {
    pub fn command(&self) -> Option<CommandSpec> {
        match (&self.argv, &self.cmd) {
            (Some(argv), None) => Some(CommandSpec::Argv(argv.clone())),
            (None, Some(cmd)) => Some(CommandSpec::from_string(cmd)),
            _ => None,
        }
    }

    pub fn title_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(name)
    }

    /// Build the request for this operation. `name` is the table key.
    pub fn to_request(&self, name: &str) -> Result<ProcessRequest> {
        let command = self.command().ok_or_else(|| {
            ReapError::ConfigError(format!(
                "operation '{name}' must set exactly one of `argv` or `cmd`"
            ))
        })?;

        Ok(ProcessRequest::new(command)
            .with_title(self.title_or(name))
            .with_desc(self.desc.clone().unwrap_or_default())
            .with_spin_now(self.spin_now))
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerOptions,
    pub operation: BTreeMap<String, OperationConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerOptions,
        operation: BTreeMap<String, OperationConfig>,
    ) -> Self {
        Self { runner, operation }
    }

    pub fn operation(&self, name: &str) -> Result<&OperationConfig> {
        self.operation
            .get(name)
            .ok_or_else(|| ReapError::OperationNotFound(name.to_string()))
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RunnerOptions::default(), BTreeMap::new())
    }
}
