use std::fmt;

use nix::sys::signal::Signal;

/// Terminal outcome of a supervised command.
///
/// - `Succeeded`: the child exited on its own with status 0.
/// - `Failed`: the child could not be launched, exited non-zero, or died from
///   a signal the runner did not send.
/// - `Killed`: the runner terminated the child (timeout or cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    Killed,
}

impl Outcome {
    /// Process exit code used by the CLI for this outcome.
    ///
    /// `Killed` follows the `timeout(1)` convention.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Succeeded => 0,
            Outcome::Failed => 1,
            Outcome::Killed => 124,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
            Outcome::Killed => "killed",
        };
        f.write_str(s)
    }
}

/// How the runner asks a child to stop.
///
/// `Graceful` can be caught by a well-behaved process; `Forceful` cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Graceful,
    Forceful,
}

impl Termination {
    pub fn signal(self) -> Signal {
        match self {
            Termination::Graceful => Signal::SIGTERM,
            Termination::Forceful => Signal::SIGKILL,
        }
    }
}
