// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, parse_duration, validate_runner_options};
use crate::errors::ReapError;
use crate::exec::{
    CommandSpec, ProcessRequest, Runner, RunnerOptions, TerminalProgress, cancel_pair,
};
use crate::fs::RealFileSystem;

/// Everything needed to run one command, resolved from CLI + config.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request: ProcessRequest,
    pub options: RunnerOptions,
    pub destructive: bool,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - request resolution (named operation or ad-hoc command)
/// - the runner, with a terminal progress line when stderr is a terminal
/// - Ctrl-C → cancel
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(&RealFileSystem, args.config.as_deref())?;
    let invocation = resolve(&args, &cfg)?;

    if args.dry_run {
        print_dry_run(&invocation);
        return Ok(0);
    }

    let Invocation {
        request,
        options,
        destructive,
    } = invocation;

    let (cancel, token) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        warn!("interrupt received; terminating child");
        cancel.cancel();
    });

    let mut runner = Runner::new(options).with_cancel(token);
    if !args.quiet && std::io::stderr().is_terminal() {
        runner = runner.with_progress(TerminalProgress::new(std::io::stderr()));
    }

    let result = runner.run(&request).await;
    interrupt.abort();
    let result = result?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(result.output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("writing command output")?;
    drop(stdout);

    debug!(summary = %report::summary(request.title(), &result), "run complete");

    if let Some(msg) = report::failure_message(request.title(), &result, destructive) {
        eprintln!("o2reap: {msg}");
    }

    Ok(result.outcome().exit_code())
}

/// Combine CLI arguments and config into a single [`Invocation`].
pub fn resolve(args: &CliArgs, cfg: &ConfigFile) -> errors::Result<Invocation> {
    let mut options = cfg.runner.clone();
    if let Some(ref s) = args.timeout {
        options.timeout = cli_duration("--timeout", s)?;
    }
    if let Some(ref s) = args.tick {
        options.tick = cli_duration("--tick", s)?;
    }
    if let Some(n) = args.grace_ticks {
        options.grace_ticks = n;
    }
    validate_runner_options(&options)?;

    let (command, default_title, mut desc, mut spin_now, mut destructive) =
        if let Some(ref name) = args.op {
            let op = cfg.operation(name)?;
            let base = op.to_request(name)?;
            (
                base.command().clone(),
                base.title().to_string(),
                base.desc().to_string(),
                op.spin_now,
                op.destructive,
            )
        } else {
            let command = command_from_words(&args.command, args.shell)?;
            let title = match &command {
                CommandSpec::Argv(argv) => argv.first().cloned().unwrap_or_default(),
                CommandSpec::Shell(_) => "command".to_string(),
            };
            (command, title, String::new(), false, false)
        };

    if let Some(ref d) = args.desc {
        desc = d.clone();
    }
    spin_now |= args.spin_now;
    destructive |= args.destructive;

    let title = args.title.clone().unwrap_or(default_title);
    let request = ProcessRequest::new(command)
        .with_title(title)
        .with_desc(desc)
        .with_spin_now(spin_now);

    Ok(Invocation {
        request,
        options,
        destructive,
    })
}

/// Positional words → command.
///
/// - `--shell`: words joined with spaces, run via `sh -c`;
/// - a single word follows the plain-string rule (whitespace → shell);
/// - several words are an argv list.
fn command_from_words(words: &[String], shell: bool) -> errors::Result<CommandSpec> {
    if words.is_empty() {
        return Err(ReapError::ConfigError("no command given".to_string()));
    }
    let command = if shell {
        CommandSpec::Shell(words.join(" "))
    } else if let [single] = words {
        CommandSpec::from_string(single)
    } else {
        CommandSpec::Argv(words.to_vec())
    };
    Ok(command)
}

fn cli_duration(flag: &str, value: &str) -> errors::Result<std::time::Duration> {
    parse_duration(value).map_err(|e| ReapError::ConfigError(format!("{flag}: {e}")))
}

fn print_dry_run(inv: &Invocation) {
    let req = &inv.request;
    println!("o2reap dry-run");
    println!("  command: {}", req.command());
    println!("  title: {}", req.title());
    if !req.desc().is_empty() {
        println!("  desc: {}", req.desc());
    }
    println!("  spin_now: {}", req.spin_now());
    println!("  destructive: {}", inv.destructive);
    println!(
        "  tick: {:?}, budget: {} ticks, grace: {} ticks",
        inv.options.tick,
        inv.options.budget_ticks(req.spin_now()),
        inv.options.grace_ticks
    );
    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::config::{OperationConfig, RawConfigFile};

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["o2reap"];
        full.extend_from_slice(argv);
        CliArgs::try_parse_from(full).unwrap()
    }

    fn cfg_with_umount() -> ConfigFile {
        let mut raw = RawConfigFile::default();
        raw.operation.insert(
            "umount".to_string(),
            OperationConfig {
                argv: Some(vec!["umount".into(), "/mnt/ocfs2".into()]),
                title: Some("Unmount".into()),
                desc: Some("Unmounting".into()),
                destructive: true,
                ..OperationConfig::default()
            },
        );
        ConfigFile::try_from(raw).unwrap()
    }

    #[test]
    fn single_word_with_spaces_goes_through_shell() {
        let inv = resolve(&args(&["echo a; echo b"]), &ConfigFile::default()).unwrap();
        assert_eq!(inv.request.command(), &CommandSpec::shell("echo a; echo b"));
        assert_eq!(inv.request.title(), "command");
    }

    #[test]
    fn several_words_are_argv() {
        let inv = resolve(&args(&["--", "mount", "-t", "ocfs2"]), &ConfigFile::default()).unwrap();
        assert_eq!(inv.request.command(), &CommandSpec::argv(["mount", "-t", "ocfs2"]));
        assert_eq!(inv.request.title(), "mount");
        assert!(!inv.destructive);
    }

    #[test]
    fn shell_flag_joins_words() {
        let inv = resolve(&args(&["--shell", "echo", "a;", "echo", "b"]), &ConfigFile::default())
            .unwrap();
        assert_eq!(inv.request.command(), &CommandSpec::shell("echo a; echo b"));
    }

    #[test]
    fn named_operation_with_overrides() {
        let inv = resolve(
            &args(&["--op", "umount", "--timeout", "3s", "--desc", "Detaching"]),
            &cfg_with_umount(),
        )
        .unwrap();
        assert_eq!(inv.request.command(), &CommandSpec::argv(["umount", "/mnt/ocfs2"]));
        assert_eq!(inv.request.title(), "Unmount");
        assert_eq!(inv.request.desc(), "Detaching");
        assert_eq!(inv.options.timeout, Duration::from_secs(3));
        assert!(inv.destructive);
    }

    #[test]
    fn unknown_operation_is_reported() {
        let err = resolve(&args(&["--op", "fsck"]), &cfg_with_umount()).unwrap_err();
        assert!(matches!(err, ReapError::OperationNotFound(name) if name == "fsck"));
    }

    #[test]
    fn bad_override_is_a_config_error() {
        let err = resolve(&args(&["--tick", "fast", "true"]), &ConfigFile::default()).unwrap_err();
        assert!(matches!(err, ReapError::ConfigError(msg) if msg.starts_with("--tick")));
    }
}
