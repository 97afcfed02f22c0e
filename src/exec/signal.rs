// src/exec/signal.rs

use nix::errno::Errno;
use nix::sys::signal::killpg;
use nix::unistd::Pid;
use tokio::process::Child;
use tracing::{debug, warn};

use crate::types::Termination;

/// Send `how` to the whole process group of `child`.
///
/// Requires the child to have been spawned with `process_group(0)` so that its
/// PGID equals its PID, which lets the signal reach everything a shell string
/// started. No-op once the child has been reaped.
pub(crate) fn terminate(child: &Child, how: Termination) {
    let Some(pid) = child.id() else {
        debug!(?how, "child already reaped; no signal sent");
        return;
    };
    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid does not fit in pid_t; no signal sent");
        return;
    };

    match killpg(Pid::from_raw(raw), how.signal()) {
        Ok(()) => debug!(pid, signal = %how.signal(), "signalled process group"),
        // The group exited between the liveness check and the signal.
        Err(Errno::ESRCH) => debug!(pid, signal = %how.signal(), "process group already gone"),
        Err(e) => warn!(pid, signal = %how.signal(), error = %e, "failed to signal process group"),
    }
}

/// Spawn errors that mean the machine is out of something, as opposed to the
/// command itself being bad.
pub(crate) fn is_resource_exhaustion(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error().map(Errno::from_raw),
        Some(Errno::EMFILE | Errno::ENFILE | Errno::ENOMEM | Errno::EAGAIN)
    )
}
