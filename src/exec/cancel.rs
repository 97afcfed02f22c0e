// src/exec/cancel.rs

//! External cancellation of a running command.
//!
//! Cancelling starts the same graceful → forceful sequence the timeout does.
//! Dropping the handle without calling [`CancelHandle::cancel`] does nothing.

use tokio::sync::oneshot;

#[derive(Debug)]
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

#[derive(Debug)]
pub struct CancelToken {
    pub(crate) rx: oneshot::Receiver<()>,
}

/// Create a connected handle/token pair.
///
/// Give the token to [`crate::exec::Runner::with_cancel`] and keep the handle.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelHandle {
    /// Ask the runner to terminate the child.
    ///
    /// Returns `false` if the run had already finished.
    pub fn cancel(self) -> bool {
        self.tx.send(()).is_ok()
    }
}
