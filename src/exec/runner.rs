// src/exec/runner.rs

//! The bounded process runner.
//!
//! One [`Runner`] supervises exactly one child:
//!
//! - stdout and stderr share a single pipe, read without blocking as data
//!   becomes ready;
//! - the child is polled once per tick; when the tick budget runs out it gets
//!   the graceful signal, then the forceful one if it is still alive after
//!   `grace_ticks` more ticks;
//! - whatever happens, the caller gets exactly one [`ProcessResult`].
//!
//! Everything runs on the calling task; nothing is spawned besides the child.

use std::io::ErrorKind;
use std::os::fd::OwnedFd;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, info, warn};

use crate::errors::{ReapError, Result};
use crate::exec::cancel::CancelToken;
use crate::exec::progress::{NoProgress, ProgressSink};
use crate::exec::request::ProcessRequest;
use crate::exec::result::ProcessResult;
use crate::exec::signal::{self, is_resource_exhaustion};
use crate::types::Termination;

/// Tunables for the tick loop. None of these are part of the result contract.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerOptions {
    /// Interval between liveness polls.
    pub tick: Duration,
    /// Budget before the graceful signal is sent.
    pub timeout: Duration,
    /// Budget used instead of `timeout` for `spin_now` requests.
    pub spin_timeout: Duration,
    /// Ticks to wait after the graceful signal before the forceful one.
    pub grace_ticks: u32,
    /// Fraction of the budget after which the progress surface is shown.
    pub progress_threshold: f64,
    /// Maximum bytes taken from the pipe per read.
    pub read_chunk: usize,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            spin_timeout: Duration::from_secs(600),
            grace_ticks: 5,
            progress_threshold: 0.1,
            read_chunk: 1024,
        }
    }
}

impl RunnerOptions {
    fn effective_tick(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }

    /// Number of ticks before the graceful signal. Always at least one.
    pub fn budget_ticks(&self, spin_now: bool) -> u64 {
        let total = if spin_now { self.spin_timeout } else { self.timeout };
        let ticks = total.as_nanos() / self.effective_tick().as_nanos();
        u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
    }

    /// Tick at which a quiet run surfaces its progress indicator.
    pub fn threshold_ticks(&self, budget: u64) -> u64 {
        let fraction = self.progress_threshold.clamp(0.0, 1.0);
        ((budget as f64 * fraction).ceil() as u64).max(1)
    }

    fn effective_grace_ticks(&self) -> u32 {
        self.grace_ticks.max(1)
    }

    /// Wall-clock length of the grace window.
    pub fn grace(&self) -> Duration {
        self.effective_tick() * self.effective_grace_ticks()
    }
}

/// Supervises one command. Consumed by [`Runner::run`].
pub struct Runner {
    options: RunnerOptions,
    progress: Box<dyn ProgressSink>,
    cancel: Option<CancelToken>,
}

impl Runner {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            options,
            progress: Box::new(NoProgress),
            cancel: None,
        }
    }

    pub fn with_progress<P: ProgressSink + 'static>(mut self, progress: P) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `request` to completion or termination.
    ///
    /// Launch failures, non-zero exits and timeouts all come back as `Ok`.
    /// `Err` means the environment could not support the run at all (no file
    /// descriptors, no memory, no reactor registration).
    pub async fn run(mut self, request: &ProcessRequest) -> Result<ProcessResult> {
        let started = Instant::now();
        info!(
            title = %request.title(),
            cmd = %request.command(),
            spin_now = request.spin_now(),
            "starting process"
        );

        let Some(mut cmd) = request.command().to_command() else {
            warn!(title = %request.title(), "empty command line; nothing to run");
            return Ok(ProcessResult::launch_failure(
                "empty command line".to_string(),
                started.elapsed(),
            ));
        };

        let (pipe_rx, pipe_tx) =
            std::io::pipe().map_err(|e| ReapError::exhausted("creating output pipe", e))?;
        let pipe_tx_err = pipe_tx
            .try_clone()
            .map_err(|e| ReapError::exhausted("duplicating output pipe", e))?;

        cmd.stdin(Stdio::null())
            .stdout(pipe_tx)
            .stderr(pipe_tx_err)
            .process_group(0)
            .kill_on_drop(true);

        let spawned = cmd.spawn();
        // The command still owns the parent's copies of the write end; they
        // must be closed or the reader never sees EOF.
        drop(cmd);

        let child = match spawned {
            Ok(child) => child,
            Err(e) if is_resource_exhaustion(&e) => {
                return Err(ReapError::exhausted(
                    format!("spawning `{}`", request.command()),
                    e,
                ));
            }
            Err(e) => {
                warn!(cmd = %request.command(), error = %e, "failed to launch process");
                return Ok(ProcessResult::launch_failure(e.to_string(), started.elapsed()));
            }
        };

        let mut reader = pipe::Receiver::from_owned_fd(OwnedFd::from(pipe_rx))
            .map_err(|e| ReapError::exhausted("registering output pipe", e))?;

        let budget = self.options.budget_ticks(request.spin_now());
        let mut sup = Supervisor {
            child,
            request,
            progress: &mut *self.progress,
            phase: Phase::Running { remaining: budget },
            threshold: self.options.threshold_ticks(budget),
            grace_ticks: self.options.effective_grace_ticks(),
            elapsed_ticks: 0,
            shown: false,
            killed: false,
            forced: false,
        };
        debug!(budget, threshold = sup.threshold, "tick budget");

        if request.spin_now() {
            sup.show();
        }

        let tick = self.options.effective_tick();
        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cancel = self.cancel.take().map(|t| t.rx);
        let mut buf = vec![0u8; self.options.read_chunk.max(1)];
        let mut captured: Vec<u8> = Vec::new();
        let mut reading = true;

        let status = loop {
            tokio::select! {
                biased;

                res = reader.read(&mut buf), if reading => {
                    reading = absorb_read(res, &buf, &mut captured);
                }

                requested = wait_cancel(&mut cancel), if cancel.is_some() => {
                    cancel = None;
                    if requested {
                        sup.begin_termination("cancelled");
                    }
                }

                _ = ticker.tick() => {
                    match sup.on_tick() {
                        Tick::Continue => {}
                        Tick::Exited(status) => break status,
                    }
                }
            }
        };

        if reading {
            let grace = self.options.grace();
            let drain = async {
                loop {
                    let res = reader.read(&mut buf).await;
                    if !absorb_read(res, &buf, &mut captured) {
                        break;
                    }
                }
            };
            if timeout(grace, drain).await.is_err() {
                debug!(
                    grace_ms = grace.as_millis() as u64,
                    "output pipe still open after child exit; something it started holds it"
                );
            }
        }

        sup.progress.finish();

        let exit_code = status.and_then(|s| s.code());
        let result = ProcessResult::finish(
            &captured,
            exit_code,
            sup.killed,
            sup.forced,
            started.elapsed(),
        );

        info!(
            title = %request.title(),
            outcome = %result.outcome(),
            exit_code = ?result.exit_code,
            killed = result.killed,
            forced = result.forced,
            bytes = captured.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "process finished"
        );

        Ok(result)
    }

    /// Drive [`Runner::run`] to completion on a fresh current-thread runtime.
    ///
    /// For synchronous callers. Panics if called from inside a tokio runtime.
    pub fn run_blocking(self, request: &ProcessRequest) -> Result<ProcessResult> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ReapError::exhausted("building runtime", e))?;
        rt.block_on(self.run(request))
    }
}

/// Run `request` headless with default options.
pub async fn run(request: &ProcessRequest) -> Result<ProcessResult> {
    Runner::new(RunnerOptions::default()).run(request).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the child within the normal budget.
    Running { remaining: u64 },
    /// Graceful signal sent; waiting before escalating.
    Grace { remaining: u32 },
    /// Forceful signal sent; waiting to reap.
    Reaping { remaining: u32 },
}

enum Tick {
    Continue,
    /// `None` when the exit status could not be obtained.
    Exited(Option<ExitStatus>),
}

struct Supervisor<'a> {
    child: Child,
    request: &'a ProcessRequest,
    progress: &'a mut dyn ProgressSink,
    phase: Phase,
    threshold: u64,
    grace_ticks: u32,
    elapsed_ticks: u64,
    shown: bool,
    killed: bool,
    forced: bool,
}

impl Supervisor<'_> {
    fn show(&mut self) {
        if !self.shown {
            self.shown = true;
            self.progress
                .show(self.request.title(), self.request.desc(), self.request.parent());
        }
    }

    fn on_tick(&mut self) -> Tick {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(?status, phase = ?self.phase, "child exited");
                return Tick::Exited(Some(status));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to poll child status; giving up on it");
                return Tick::Exited(None);
            }
        }

        match self.phase {
            Phase::Running { remaining } => {
                self.elapsed_ticks += 1;
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.begin_termination("timeout");
                    return Tick::Continue;
                }
                self.phase = Phase::Running { remaining };

                if self.elapsed_ticks >= self.threshold {
                    self.show();
                }
                self.progress.pulse();
            }
            Phase::Grace { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    warn!(
                        title = %self.request.title(),
                        "child ignored graceful termination; sending forceful signal"
                    );
                    signal::terminate(&self.child, Termination::Forceful);
                    self.forced = true;
                    self.progress.signalled(Termination::Forceful);
                    self.phase = Phase::Reaping {
                        remaining: self.grace_ticks,
                    };
                } else {
                    self.phase = Phase::Grace { remaining };
                }
            }
            Phase::Reaping { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    // Stuck in the kernel (e.g. uninterruptible I/O); kill_on_drop
                    // is all that is left to try.
                    warn!(
                        title = %self.request.title(),
                        "child still alive after forceful signal; abandoning it"
                    );
                    return Tick::Exited(None);
                }
                self.phase = Phase::Reaping { remaining };
            }
        }

        Tick::Continue
    }

    /// Send the graceful signal and start the grace window. Ignored once
    /// termination has begun.
    fn begin_termination(&mut self, reason: &str) {
        if !matches!(self.phase, Phase::Running { .. }) {
            return;
        }
        info!(
            title = %self.request.title(),
            reason,
            elapsed_ticks = self.elapsed_ticks,
            "terminating child"
        );
        signal::terminate(&self.child, Termination::Graceful);
        self.killed = true;
        self.progress.signalled(Termination::Graceful);
        self.phase = Phase::Grace {
            remaining: self.grace_ticks,
        };
    }
}

/// Fold one read into the buffer. Returns whether to keep reading.
fn absorb_read(res: std::io::Result<usize>, buf: &[u8], captured: &mut Vec<u8>) -> bool {
    match res {
        Ok(0) => {
            debug!("output stream closed");
            false
        }
        Ok(n) => {
            captured.extend_from_slice(&buf[..n]);
            true
        }
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => true,
        Err(e) => {
            debug!(error = %e, "read error on output stream; no more output");
            false
        }
    }
}

/// Resolves to `true` on an explicit cancel, `false` if the handle was dropped.
async fn wait_cancel(cancel: &mut Option<oneshot::Receiver<()>>) -> bool {
    match cancel {
        Some(rx) => rx.await.is_ok(),
        None => std::future::pending().await,
    }
}
