// TikTok publisher placeholder

use async_trait::async_trait;
use dayclip_core::{PlatformName, ProgressFn};

use crate::error::PublishError;
use crate::publisher::{PlatformPublisher, PublishReceipt, PublishRequest};

#[derive(Debug, Default, Clone, Copy)]
pub struct TiktokPublisher;

#[async_trait]
impl PlatformPublisher for TiktokPublisher {
    fn platform(&self) -> PlatformName {
        PlatformName::Tiktok
    }

    async fn publish(
        &self,
        request: &PublishRequest,
        _on_progress: ProgressFn<'_>,
    ) -> Result<PublishReceipt, PublishError> {
        tracing::debug!(title = %request.title, "TikTok publishing requested");
        Err(PublishError::NotImplemented(PlatformName::Tiktok))
    }
}
