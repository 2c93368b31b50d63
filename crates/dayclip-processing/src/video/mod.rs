//! Video processing module

pub mod overlay;
pub mod processor;
pub mod progress;
pub mod thumbnail;
pub mod transformer;

pub use overlay::OverlayPlan;
pub use processor::VideoProcessor;
pub use progress::FfmpegProgressParser;
pub use thumbnail::ThumbnailExtractor;
pub use transformer::{DayOverlayTransformer, DayOverlayTransformerConfig};
