// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Command-line arguments for `o2reap`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "o2reap",
    version,
    about = "Run an external command with a timeout and TERM-then-KILL escalation.",
    long_about = None
)]
#[command(group(ArgGroup::new("what").required(true).args(["op", "command"])))]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `$O2REAP_CONFIG`, else `O2reap.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the named `[operation.<NAME>]` from the config file.
    #[arg(long, value_name = "NAME")]
    pub op: Option<String>,

    /// Join the command words into one string and run it with `sh -c`.
    #[arg(long)]
    pub shell: bool,

    /// Time budget before the child is asked to stop (e.g. "10s").
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Poll interval (e.g. "100ms").
    #[arg(long, value_name = "DURATION")]
    pub tick: Option<String>,

    /// Ticks between the graceful and the forceful signal.
    #[arg(long, value_name = "N")]
    pub grace_ticks: Option<u32>,

    /// Title shown on the progress line and in failure messages.
    #[arg(long)]
    pub title: Option<String>,

    /// Description shown on the progress line.
    #[arg(long)]
    pub desc: Option<String>,

    /// Show progress right away and use the long timeout.
    #[arg(long)]
    pub spin_now: bool,

    /// Warn that the system may be inconsistent if the command gets killed.
    #[arg(long)]
    pub destructive: bool,

    /// Never print progress.
    #[arg(long, short)]
    pub quiet: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `O2REAP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the request, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run (program and arguments).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
