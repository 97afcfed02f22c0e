use std::sync::{Arc, Mutex};

use o2reap::exec::{ParentHandle, ProgressSink};
use o2reap::types::Termination;

/// One call the runner made on its progress sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Show {
        title: String,
        desc: String,
        has_parent: bool,
    },
    Pulse,
    Signalled(Termination),
    Finish,
}

/// A progress sink that records every call.
///
/// Clone it before handing it to the runner; the clone shares the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Signals in the order they were sent.
    pub fn signals(&self) -> Vec<Termination> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Signalled(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Number of pulses seen before the surface was shown, or `None` if it
    /// never was.
    pub fn pulses_before_show(&self) -> Option<usize> {
        let events = self.events();
        let idx = events
            .iter()
            .position(|e| matches!(e, ProgressEvent::Show { .. }))?;
        Some(
            events[..idx]
                .iter()
                .filter(|e| matches!(e, ProgressEvent::Pulse))
                .count(),
        )
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressSink for RecordingProgress {
    fn show(&mut self, title: &str, desc: &str, parent: Option<&ParentHandle>) {
        self.push(ProgressEvent::Show {
            title: title.to_string(),
            desc: desc.to_string(),
            has_parent: parent.is_some(),
        });
    }

    fn pulse(&mut self) {
        self.push(ProgressEvent::Pulse);
    }

    fn signalled(&mut self, how: Termination) {
        self.push(ProgressEvent::Signalled(how));
    }

    fn finish(&mut self) {
        self.push(ProgressEvent::Finish);
    }
}
