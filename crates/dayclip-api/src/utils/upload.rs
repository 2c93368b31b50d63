use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use dayclip_core::models::parse_platform_selection;
use dayclip_core::{AppError, UploadRequest};
use dayclip_services::ArtifactCleaner;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const VIDEO_FIELD: &str = "video";
pub const DAY_FIELD: &str = "day";
pub const PLATFORMS_FIELD: &str = "platforms";

/// Fields of the upload form. The video has already been written to `video_path`.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub video_path: PathBuf,
    pub day: Option<String>,
    pub platforms: Option<String>,
}

impl UploadForm {
    /// Validate the text fields and build the pipeline request.
    ///
    /// A missing or blank `platforms` field selects nothing.
    pub fn to_request(&self, session_id: Option<String>) -> Result<UploadRequest, AppError> {
        let day = self
            .day
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing 'day' field".to_string()))?;
        let day_label = day
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("day must be an integer, got '{}'", day)))?;

        let requested_platforms = match self.platforms.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_platform_selection(raw)?,
            _ => BTreeSet::new(),
        };

        Ok(UploadRequest {
            source_path: self.video_path.clone(),
            day_label,
            requested_platforms,
            session_id,
        })
    }
}

#[derive(Default)]
struct PartialForm {
    video_path: Option<PathBuf>,
    day: Option<String>,
    platforms: Option<String>,
}

impl PartialForm {
    async fn read(&mut self, multipart: &mut Multipart, upload_dir: &Path) -> Result<(), AppError> {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                VIDEO_FIELD => {
                    if self.video_path.is_some() {
                        return Err(AppError::InvalidInput(
                            "Multiple video fields are not allowed; send exactly one field named 'video'"
                                .to_string(),
                        ));
                    }
                    let path = upload_dir.join(Uuid::new_v4().to_string());
                    self.video_path = Some(path.clone());
                    let written = write_field_to_file(field, &path).await?;
                    if written == 0 {
                        return Err(AppError::InvalidInput("Uploaded video is empty".to_string()));
                    }
                    tracing::debug!(path = %path.display(), bytes = written, "Upload stored");
                }
                DAY_FIELD => self.day = Some(field.text().await.map_err(multipart_error)?),
                PLATFORMS_FIELD => {
                    self.platforms = Some(field.text().await.map_err(multipart_error)?)
                }
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }
        Ok(())
    }
}

/// Read the upload form, streaming the `video` field into `upload_dir` under a
/// generated name. Nothing is left on disk when this fails.
pub async fn read_upload_form(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<UploadForm, AppError> {
    let mut form = PartialForm::default();
    let result = form.read(&mut multipart, upload_dir).await;

    match (result, form.video_path) {
        (Ok(()), Some(video_path)) => Ok(UploadForm {
            video_path,
            day: form.day,
            platforms: form.platforms,
        }),
        (Ok(()), None) => Err(AppError::InvalidInput(
            "Missing 'video' file field".to_string(),
        )),
        (Err(e), video_path) => {
            if let Some(path) = video_path {
                if let Err(remove_err) = ArtifactCleaner::remove_if_exists(&path).await {
                    tracing::warn!(error = %remove_err, path = %path.display(), "Failed to remove partial upload");
                }
            }
            Err(e)
        }
    }
}

async fn write_field_to_file(mut field: Field<'_>, path: &Path) -> Result<u64, AppError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload file: {}", e)))?;

    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// True for a plain file name with no directory components.
pub fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}
