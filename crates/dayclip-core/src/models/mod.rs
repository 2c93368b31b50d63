//! Domain models shared by the pipeline, its collaborators and the HTTP layer.

pub mod platform;
pub mod progress;
pub mod upload;
pub mod weights;

pub use platform::{PlatformName, PlatformOutcome, PublishStatus, UnknownPlatform};
pub use progress::{codes, ProgressEvent, ProgressFn};
pub use upload::{parse_platform_selection, PipelineResult, UploadRequest, UploadResponse};
pub use weights::{clamp_percent, StageWeights};
