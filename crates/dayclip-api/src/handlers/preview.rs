use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::is_bare_file_name;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use dayclip_core::AppError;
use std::io;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// `GET /upload/preview/{file_name}`: stream a transformed artifact.
pub async fn preview_video(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, HttpAppError> {
    if !is_bare_file_name(&file_name) {
        return Err(AppError::InvalidInput("Invalid file name".to_string()).into());
    }

    let path = state.processed_dir().join(&file_name);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };
    let metadata = file.metadata().await.map_err(AppError::from)?;
    if !metadata.is_file() {
        return Err(AppError::NotFound("File not found".to_string()).into());
    }

    tracing::debug!(file_name = %file_name, bytes = metadata.len(), "Serving preview");

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}
