//! Fake collaborators standing in for ffmpeg and the platform APIs.

use async_trait::async_trait;
use dayclip_core::{PlatformName, ProgressFn};
use dayclip_platforms::{PlatformPublisher, PublishError, PublishReceipt, PublishRequest};
use dayclip_processing::{MediaTransform, TransformError, TransformOutput, TransformRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

pub const ARTIFACT_BYTES: &[u8] = b"transformed clip";

/// Copies nothing; writes a small artifact into the processed dir.
#[derive(Debug)]
pub struct FakeTransform {
    output_dir: PathBuf,
    fail: bool,
}

impl FakeTransform {
    pub fn succeeding(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            fail: false,
        }
    }

    pub fn failing(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            fail: true,
        }
    }
}

pub fn succeeding_transform(output_dir: &Path) -> Arc<dyn MediaTransform> {
    Arc::new(FakeTransform::succeeding(output_dir))
}

pub fn failing_transform(output_dir: &Path) -> Arc<dyn MediaTransform> {
    Arc::new(FakeTransform::failing(output_dir))
}

#[async_trait]
impl MediaTransform for FakeTransform {
    async fn transform(
        &self,
        request: &TransformRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<TransformOutput, TransformError> {
        assert!(request.source_path.exists(), "upload must exist during transform");
        on_progress(0.0);
        if self.fail {
            return Err(TransformError::Ffmpeg {
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        on_progress(50.0);

        let file_name = format!("{}.mp4", Uuid::new_v4());
        let artifact_path = self.output_dir.join(&file_name);
        tokio::fs::write(&artifact_path, ARTIFACT_BYTES).await?;
        on_progress(100.0);

        Ok(TransformOutput {
            artifact_path,
            file_name,
        })
    }
}

#[derive(Debug)]
pub struct FakePublisher {
    platform: PlatformName,
    fail: bool,
}

impl FakePublisher {
    pub fn succeeding(platform: PlatformName) -> Self {
        Self {
            platform,
            fail: false,
        }
    }

    pub fn failing(platform: PlatformName) -> Self {
        Self {
            platform,
            fail: true,
        }
    }
}

#[async_trait]
impl PlatformPublisher for FakePublisher {
    fn platform(&self) -> PlatformName {
        self.platform
    }

    async fn publish(
        &self,
        request: &PublishRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<PublishReceipt, PublishError> {
        if self.fail {
            return Err(PublishError::MissingCredentials {
                platform: self.platform,
                reason: "no refresh token".to_string(),
            });
        }
        assert!(request.artifact_path.exists(), "artifact must exist while publishing");
        on_progress(50.0);
        on_progress(100.0);
        Ok(PublishReceipt {
            video_id: Some("vid123".to_string()),
            url: Some("https://youtube.com/shorts/vid123".to_string()),
        })
    }
}
