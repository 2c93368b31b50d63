use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::read_upload_form;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use dayclip_core::UploadResponse;
use std::sync::Arc;

/// Header carrying the caller's progress session id.
pub const SESSION_HEADER: &str = "x-socket-id";

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `POST /upload`: transform the clip, publish it, answer with every platform's outcome.
///
/// The raw upload is deleted whatever the result; the transformed artifact
/// stays available for preview until the retention window passes.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let form = read_upload_form(multipart, state.upload_dir()).await?;

    let request = match form.to_request(session_id(&headers)) {
        Ok(request) => request,
        Err(e) => {
            state.cleaner.discard_upload(&form.video_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        day = request.day_label,
        platforms = ?request.requested_platforms,
        session_id = request.session_id.as_deref().unwrap_or(""),
        "Upload received"
    );

    let outcome = state.pipeline.run(&request).await;
    state.cleaner.discard_upload(&request.source_path).await;

    let result = outcome?;
    state.cleaner.schedule_removal(result.artifact_path.clone());

    Ok(Json(UploadResponse::from(&result)))
}
