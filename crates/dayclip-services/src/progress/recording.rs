use dayclip_core::ProgressEvent;
use std::sync::{Mutex, PoisonError};

use super::emitter::ProgressEmitter;

/// Emitter that keeps every event in memory. Used to assert on emitted sequences.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<(String, ProgressEvent)>>,
}

impl RecordingEmitter {
    /// All events, with their session id, in emission order.
    pub fn events(&self) -> Vec<(String, ProgressEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events_for(&self, session_id: &str) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|(id, _)| id == session_id)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn codes_for(&self, session_id: &str) -> Vec<String> {
        self.events_for(session_id)
            .into_iter()
            .map(|event| event.code)
            .collect()
    }
}

impl ProgressEmitter for RecordingEmitter {
    fn emit(&self, session_id: &str, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((session_id.to_string(), event.clone()));
    }
}
