//! Dayclip media processing
//!
//! The media engine collaborator of the upload pipeline: probes a source clip
//! with ffprobe and re-encodes it with ffmpeg (day overlay + speed-up), reporting
//! fractional progress while doing so.

pub mod error;
pub mod metadata;
pub mod traits;
pub mod video;

pub use error::TransformError;
pub use metadata::VideoMetadata;
pub use traits::{MediaTransform, TransformOutput, TransformRequest};
pub use video::{DayOverlayTransformer, OverlayPlan, ThumbnailExtractor, VideoProcessor};
