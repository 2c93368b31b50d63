//! Dayclip Services Layer
//!
//! Business orchestration between the HTTP layer and the collaborators: the
//! [`UploadPipeline`] that sequences transform and publish stages, the
//! session-keyed progress hub that fans events out to listeners, and the
//! cleanup of temporary upload files and artifacts. Keep HTTP handling in
//! `dayclip-api`.

pub mod cleanup;
pub mod pipeline;
pub mod progress;

pub use cleanup::ArtifactCleaner;
pub use pipeline::{PipelineError, UploadPipeline};
pub use progress::{ProgressEmitter, ProgressHub, ProgressNotifier, ProgressSubscription};
