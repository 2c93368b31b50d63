//! Server-Sent Events progress channel.
//!
//! A client opens `GET /events`, reads its session id from the first
//! `connected` event and sends it back in `x-socket-id` when uploading.
//! Pipeline events for that session then arrive as `upload-progress` events.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use dayclip_services::ProgressHub;
use futures::{stream, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const CONNECTED_EVENT: &str = "connected";
pub const PROGRESS_EVENT: &str = "upload-progress";

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub session_id: Option<String>,
}

/// Subscribe `session_id` on the hub. The listener lives as long as the stream.
pub fn session_event_stream(
    hub: &ProgressHub,
    session_id: String,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send + 'static {
    let connected = Event::default()
        .event(CONNECTED_EVENT)
        .json_data(json!({ "sessionId": session_id }));
    let subscription = hub.subscribe(session_id);

    stream::once(async move { connected }).chain(
        subscription.map(|event| Event::default().event(PROGRESS_EVENT).json_data(&event)),
    )
}

pub async fn progress_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let session_id = query
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::debug!(session_id = %session_id, "Progress channel opened");

    Sse::new(session_event_stream(&state.hub, session_id))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
