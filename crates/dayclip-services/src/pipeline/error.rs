use dayclip_core::AppError;
use dayclip_processing::TransformError;

/// The only way a pipeline run can fail. Publish failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Video transform failed: {0}")]
    TransformFailure(#[source] TransformError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::MediaConversionError(err.to_string())
    }
}
