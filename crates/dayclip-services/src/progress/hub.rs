//! In-process session hub: listeners subscribe under a session id and receive
//! every event emitted for it afterwards. No replay, no buffering for absent
//! listeners. Each listener queue holds at most [`LISTENER_BUFFER`] events; a
//! listener that stops reading loses the overflow.

use dayclip_core::ProgressEvent;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::emitter::ProgressEmitter;

/// Pending events kept per listener before new ones are dropped.
pub const LISTENER_BUFFER: usize = 256;

type Listeners = HashMap<String, Vec<(u64, mpsc::Sender<ProgressEvent>)>>;

#[derive(Default)]
struct HubInner {
    listeners: RwLock<Listeners>,
    next_id: AtomicU64,
}

impl HubInner {
    fn unregister(&self, session_id: &str, listener_id: u64) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = listeners.get_mut(session_id) {
            entries.retain(|(id, _)| *id != listener_id);
            if entries.is_empty() {
                listeners.remove(session_id);
            }
        }
    }
}

/// Registry of session listeners.
#[derive(Clone, Default)]
pub struct ProgressHub {
    inner: Arc<HubInner>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `session_id`. It is removed when the subscription is dropped.
    pub fn subscribe(&self, session_id: impl Into<String>) -> ProgressSubscription {
        let session_id = session_id.into();
        let listener_id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(LISTENER_BUFFER);

        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(session_id.clone())
            .or_default()
            .push((listener_id, tx));

        tracing::debug!(session_id = %session_id, "Progress listener registered");

        ProgressSubscription {
            session_id,
            listener_id,
            receiver: rx,
            hub: Arc::clone(&self.inner),
        }
    }

    /// Number of listeners currently registered for `session_id`.
    pub fn listener_count(&self, session_id: &str) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .map_or(0, Vec::len)
    }
}

impl ProgressEmitter for ProgressHub {
    fn emit(&self, session_id: &str, event: &ProgressEvent) {
        let listeners = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match listeners.get(session_id) {
            Some(entries) => {
                for (listener_id, tx) in entries {
                    match tx.try_send(event.clone()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(
                                session_id = %session_id,
                                listener_id = *listener_id,
                                code = %event.code,
                                "Listener queue full, event dropped"
                            );
                        }
                        // A closed receiver is about to unregister itself.
                        Err(TrySendError::Closed(_)) => {}
                    }
                }
            }
            None => {
                tracing::trace!(session_id = %session_id, code = %event.code, "No listener, event dropped");
            }
        }
    }
}

/// Stream of events for one session listener.
pub struct ProgressSubscription {
    session_id: String,
    listener_id: u64,
    receiver: mpsc::Receiver<ProgressEvent>,
    hub: Arc<HubInner>,
}

impl ProgressSubscription {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.receiver.recv().await
    }
}

impl Stream for ProgressSubscription {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        self.hub.unregister(&self.session_id, self.listener_id);
        tracing::debug!(session_id = %self.session_id, "Progress listener unregistered");
    }
}
