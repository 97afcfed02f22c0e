// src/exec/result.rs

use std::time::Duration;

use crate::types::Outcome;

/// Appended to the output of every run the runner had to terminate.
pub const KILLED_MARKER: &str = "Killed prematurely.";

/// What came out of one supervised command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit status 0 and not terminated by the runner.
    pub succeeded: bool,
    /// Combined stdout/stderr in arrival order (plus [`KILLED_MARKER`] if
    /// killed), or the OS error text if the command never started.
    pub output: String,
    /// The runner terminated the child.
    pub killed: bool,
    /// The graceful signal was ignored and the forceful one was sent.
    pub forced: bool,
    /// Exit code if the child exited by itself.
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl ProcessResult {
    pub(crate) fn launch_failure(detail: String, elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            output: detail,
            killed: false,
            forced: false,
            exit_code: None,
            elapsed,
        }
    }

    /// Assemble a result from the raw captured bytes.
    ///
    /// Bytes are decoded once here rather than per read, so a multi-byte
    /// character split across two reads survives intact.
    pub(crate) fn finish(
        captured: &[u8],
        exit_code: Option<i32>,
        killed: bool,
        forced: bool,
        elapsed: Duration,
    ) -> Self {
        let succeeded = !killed && exit_code == Some(0);
        let mut output = String::from_utf8_lossy(captured).into_owned();

        if killed {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(KILLED_MARKER);
        }

        Self {
            succeeded,
            output,
            killed,
            forced,
            exit_code,
            elapsed,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.succeeded {
            Outcome::Succeeded
        } else if self.killed {
            Outcome::Killed
        } else {
            Outcome::Failed
        }
    }
}
