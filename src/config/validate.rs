// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile, RunnerSection};
use crate::errors::{ReapError, Result};
use crate::exec::RunnerOptions;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ReapError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let runner = runner_options(&raw.config)?;
        validate_operations(&raw)?;
        Ok(ConfigFile::new_unchecked(runner, raw.operation))
    }
}

/// Turn `[config]` into runner options, checking every value.
pub fn runner_options(section: &RunnerSection) -> Result<RunnerOptions> {
    let tick = config_duration("tick", &section.tick)?;
    let timeout = config_duration("timeout", &section.timeout)?;
    let spin_timeout = config_duration("spin_timeout", &section.spin_timeout)?;

    let opts = RunnerOptions {
        tick,
        timeout,
        spin_timeout,
        grace_ticks: section.grace_ticks,
        progress_threshold: section.progress_threshold,
        read_chunk: section.read_chunk,
    };
    validate_runner_options(&opts)?;
    Ok(opts)
}

fn config_duration(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| ReapError::ConfigError(format!("[config].{key}: {e}")))
}

/// Sanity checks shared by the config file and CLI overrides.
pub fn validate_runner_options(opts: &RunnerOptions) -> Result<()> {
    if opts.tick.is_zero() {
        return Err(ReapError::ConfigError(
            "[config].tick must be greater than zero".to_string(),
        ));
    }
    if opts.timeout < opts.tick {
        return Err(ReapError::ConfigError(format!(
            "[config].timeout ({:?}) must be at least one tick ({:?})",
            opts.timeout, opts.tick
        )));
    }
    if opts.spin_timeout < opts.tick {
        return Err(ReapError::ConfigError(format!(
            "[config].spin_timeout ({:?}) must be at least one tick ({:?})",
            opts.spin_timeout, opts.tick
        )));
    }
    if opts.grace_ticks == 0 {
        return Err(ReapError::ConfigError(
            "[config].grace_ticks must be >= 1 (got 0)".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&opts.progress_threshold) {
        return Err(ReapError::ConfigError(format!(
            "[config].progress_threshold must be between 0.0 and 1.0 (got {})",
            opts.progress_threshold
        )));
    }
    if opts.read_chunk == 0 {
        return Err(ReapError::ConfigError(
            "[config].read_chunk must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_operations(cfg: &RawConfigFile) -> Result<()> {
    for (name, op) in cfg.operation.iter() {
        match (&op.argv, &op.cmd) {
            (Some(_), Some(_)) => {
                return Err(ReapError::ConfigError(format!(
                    "operation '{}' sets both `argv` and `cmd`; pick one",
                    name
                )));
            }
            (None, None) => {
                return Err(ReapError::ConfigError(format!(
                    "operation '{}' must set one of `argv` or `cmd`",
                    name
                )));
            }
            (Some(argv), None) => {
                if argv.first().is_none_or(|p| p.trim().is_empty()) {
                    return Err(ReapError::ConfigError(format!(
                        "operation '{}' has an empty `argv`",
                        name
                    )));
                }
            }
            (None, Some(cmd)) => {
                if cmd.trim().is_empty() {
                    return Err(ReapError::ConfigError(format!(
                        "operation '{}' has a blank `cmd`",
                        name
                    )));
                }
            }
        }
    }
    Ok(())
}
