//! Observer that keeps every diagnostic event for later assertions

use std::sync::{Arc, Mutex};

use parley_client::{DiagnosticEvent, DiagnosticObserver, ErrorKind};

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Kinds of every `RequestFailed` event, in order
    pub fn failure_kinds(&self) -> Vec<ErrorKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DiagnosticEvent::RequestFailed { kind, .. } => Some(kind),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticObserver for RecordingObserver {
    fn observe(&self, event: &DiagnosticEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
