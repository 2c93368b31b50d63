use dayclip_core::ProgressEvent;
use std::fmt;
use std::sync::Arc;

/// Delivers events to whatever listens under a session id.
///
/// Implementations must preserve call order per session and must not block.
/// Events for a session without listeners are dropped.
pub trait ProgressEmitter: Send + Sync {
    fn emit(&self, session_id: &str, event: &ProgressEvent);
}

/// Emitter bound to one run's session id.
///
/// A no-op when the caller supplied no (or an empty) session id.
#[derive(Clone)]
pub struct ProgressNotifier {
    emitter: Arc<dyn ProgressEmitter>,
    session_id: Option<String>,
}

impl ProgressNotifier {
    pub fn new(emitter: Arc<dyn ProgressEmitter>, session_id: Option<&str>) -> Self {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Self {
            emitter,
            session_id,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn notify(&self, event: ProgressEvent) {
        if let Some(session_id) = &self.session_id {
            tracing::trace!(
                session_id = %session_id,
                code = %event.code,
                progress = event.progress,
                "Progress event"
            );
            self.emitter.emit(session_id, &event);
        }
    }
}

impl fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("session_id", &self.session_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingEmitter;

    #[test]
    fn test_notify_without_session_is_noop() {
        let recorder = Arc::new(RecordingEmitter::default());
        for session in [None, Some(""), Some("   ")] {
            let notifier = ProgressNotifier::new(recorder.clone(), session);
            assert!(notifier.session_id().is_none());
            notifier.notify(ProgressEvent::new("completed", "done", 100.0));
        }
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_notify_routes_to_session() {
        let recorder = Arc::new(RecordingEmitter::default());
        let notifier = ProgressNotifier::new(recorder.clone(), Some("abc"));
        notifier.notify(ProgressEvent::new("video-processing-start", "start", 10.0));
        notifier.notify(ProgressEvent::new("completed", "done", 100.0));

        let events = recorder.events_for("abc");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].code, "video-processing-start");
        assert_eq!(events[1].code, "completed");
    }
}
