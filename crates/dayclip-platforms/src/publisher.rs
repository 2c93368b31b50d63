//! Publisher abstraction
//!
//! Keeps platform implementations separate from the upload pipeline, which
//! only ever sees `dyn PlatformPublisher`.

use async_trait::async_trait;
use dayclip_core::{PlatformName, ProgressFn};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;

use crate::error::PublishError;

/// What a publisher receives for one run.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Transformed artifact. Read-only for publishers.
    pub artifact_path: PathBuf,
    pub title: String,
    pub day_label: i64,
}

/// Identifiers of a successfully published clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub video_id: Option<String>,
    /// Public URL of the published clip, when the platform exposes one.
    pub url: Option<String>,
}

/// Trait that all platform publishers must implement
#[async_trait]
pub trait PlatformPublisher: Send + Sync + Debug {
    /// Platform this publisher serves.
    fn platform(&self) -> PlatformName;

    /// Publish the artifact, calling `on_progress` with 0–100 as work advances.
    ///
    /// Any error is absorbed by the caller; implementations should not retry.
    async fn publish(
        &self,
        request: &PublishRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<PublishReceipt, PublishError>;
}
