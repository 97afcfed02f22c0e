#![allow(dead_code)]

use std::time::Duration;

use o2reap::config::{ConfigFile, OperationConfig, RawConfigFile};
use o2reap::exec::RunnerOptions;

/// Runner options scaled down so timeout tests finish quickly.
///
/// 20 ms ticks, the given timeout, 3 grace ticks.
pub fn fast_options(timeout: Duration) -> RunnerOptions {
    RunnerOptions {
        tick: Duration::from_millis(20),
        timeout,
        spin_timeout: timeout,
        grace_ticks: 3,
        progress_threshold: 0.1,
        read_chunk: 1024,
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

    pub fn with_operation(mut self, name: &str, op: OperationConfig) -> Self {
        self.config.operation.insert(name.to_string(), op);
        self
    }

    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.config.config.timeout = timeout.to_string();
        self
    }

    pub fn with_tick(mut self, tick: &str) -> Self {
        self.config.config.tick = tick.to_string();
        self
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

/// Builder for `OperationConfig`.
pub struct OperationBuilder {
    op: OperationConfig,
}

impl OperationBuilder {
    pub fn argv(args: &[&str]) -> Self {
        Self {
            op: OperationConfig {
                argv: Some(args.iter().map(|s| s.to_string()).collect()),
                ..OperationConfig::default()
            },
        }
    }

    pub fn cmd(cmd: &str) -> Self {
        Self {
            op: OperationConfig {
                cmd: Some(cmd.to_string()),
                ..OperationConfig::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.op.title = Some(title.to_string());
        self
    }

    pub fn desc(mut self, desc: &str) -> Self {
        self.op.desc = Some(desc.to_string());
        self
    }

    pub fn spin_now(mut self, val: bool) -> Self {
        self.op.spin_now = val;
        self
    }

    pub fn destructive(mut self, val: bool) -> Self {
        self.op.destructive = val;
        self
    }

    pub fn build(self) -> OperationConfig {
        self.op
    }
}
