//! Upload pipeline: transform, then publish to each known platform.

mod error;
mod tracker;
mod upload;

pub use error::PipelineError;
pub use tracker::ProgressTracker;
pub use upload::UploadPipeline;
