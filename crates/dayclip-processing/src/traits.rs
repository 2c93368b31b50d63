//! Core traits for media processing
//!
//! The upload pipeline only sees the [`MediaTransform`] seam; the ffmpeg
//! implementation lives in [`crate::video`].

use async_trait::async_trait;
use dayclip_core::ProgressFn;
use std::path::PathBuf;

use crate::error::TransformError;

/// Inputs of one transform.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source_path: PathBuf,
    /// Number rendered in the "Day N" overlay.
    pub day_label: i64,
}

/// Artifact produced by a successful transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub artifact_path: PathBuf,
    /// Generated, unique file name of the artifact (used for the preview URL).
    pub file_name: String,
}

/// Media transformer - turns a source clip into a publishable artifact.
#[async_trait]
pub trait MediaTransform: Send + Sync {
    /// Transform the source clip, calling `on_progress` with 0–100 as work advances.
    async fn transform(
        &self,
        request: &TransformRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<TransformOutput, TransformError>;
}
