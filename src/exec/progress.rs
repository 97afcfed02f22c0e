// src/exec/progress.rs

//! Optional progress surface for an embedding caller.
//!
//! The runner reports through a [`ProgressSink`]; every method has a no-op
//! default, so headless callers pass [`NoProgress`] and the runner behaves
//! exactly the same.

use std::io::Write;

use crate::exec::request::ParentHandle;
use crate::types::Termination;

pub trait ProgressSink: Send {
    /// Make the surface visible. Called at most once per run.
    fn show(&mut self, _title: &str, _desc: &str, _parent: Option<&ParentHandle>) {}

    /// Advance an indeterminate indicator. Called once per tick.
    fn pulse(&mut self) {}

    /// The runner sent a termination signal to the child.
    fn signalled(&mut self, _how: Termination) {}

    /// The run is over; release whatever `show` created.
    fn finish(&mut self) {}
}

impl<P: ProgressSink + ?Sized> ProgressSink for Box<P> {
    fn show(&mut self, title: &str, desc: &str, parent: Option<&ParentHandle>) {
        (**self).show(title, desc, parent)
    }

    fn pulse(&mut self) {
        (**self).pulse()
    }

    fn signalled(&mut self, how: Termination) {
        (**self).signalled(how)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Headless sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Prints `"<desc>..."` and a dot per pulse to a writer (stderr in the CLI).
///
/// Pulses before `show` are swallowed so quick commands print nothing.
#[derive(Debug)]
pub struct TerminalProgress<W: Write + Send> {
    out: W,
    shown: bool,
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, shown: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressSink for TerminalProgress<W> {
    fn show(&mut self, title: &str, desc: &str, _parent: Option<&ParentHandle>) {
        self.shown = true;
        let label = if desc.is_empty() { title } else { desc };
        let _ = write!(self.out, "{label}...");
        let _ = self.out.flush();
    }

    fn pulse(&mut self) {
        if self.shown {
            let _ = write!(self.out, ".");
            let _ = self.out.flush();
        }
    }

    fn signalled(&mut self, how: Termination) {
        if self.shown {
            let _ = write!(self.out, " [{}]", how.signal());
            let _ = self.out.flush();
        }
    }

    fn finish(&mut self) {
        if self.shown {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
            self.shown = false;
        }
    }
}
