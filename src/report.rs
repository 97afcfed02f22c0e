// src/report.rs

//! User-facing messages for a finished run.
//!
//! The runner only tells callers *what* happened; this is where a killed
//! destructive operation becomes a warning about system state.

use crate::exec::ProcessResult;
use crate::types::Outcome;

/// Message to show when a run did not succeed. `None` on success.
///
/// - killed + destructive: the privileged operation may have been cut off
///   half way, so the system state is unknown;
/// - otherwise: the captured output followed by what failed.
pub fn failure_message(title: &str, result: &ProcessResult, destructive: bool) -> Option<String> {
    match result.outcome() {
        Outcome::Succeeded => None,
        Outcome::Killed if destructive => Some(format!(
            "{title} died unexpectedly! Your system is probably in an inconsistent \
             state. You should reboot at the earliest opportunity"
        )),
        Outcome::Killed | Outcome::Failed => {
            let output = result.output.trim_end();
            if output.is_empty() {
                Some(format!("{title} failed"))
            } else {
                Some(format!("{output}: {title} failed"))
            }
        }
    }
}

/// One-line summary for the debug log.
pub fn summary(title: &str, result: &ProcessResult) -> String {
    let mut line = format!("{title}: {}", result.outcome());
    if let Some(code) = result.exit_code {
        line.push_str(&format!(" (exit {code})"));
    }
    if result.forced {
        line.push_str(" (forced)");
    }
    line
}
