// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs one external command at a time with
//! `tokio::process::Command`, bounded by a timeout, and hands back a
//! [`ProcessResult`].
//!
//! - [`request`] describes what to run (argv list or shell string).
//! - [`runner`] owns the tick loop, output capture and kill escalation.
//! - [`result`] is the terminal outcome handed back to callers.
//! - [`progress`] is the optional progress surface, with a headless default.
//! - [`cancel`] lets a caller stop a run early.
//! - [`signal`] maps graceful/forceful termination onto POSIX signals.

pub mod cancel;
pub mod progress;
pub mod request;
pub mod result;
pub mod runner;
mod signal;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use progress::{NoProgress, ProgressSink, TerminalProgress};
pub use request::{CommandSpec, ParentHandle, ProcessRequest};
pub use result::{KILLED_MARKER, ProcessResult};
pub use runner::{Runner, RunnerOptions, run};
