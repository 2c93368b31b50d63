// Instagram publisher placeholder

use async_trait::async_trait;
use dayclip_core::{PlatformName, ProgressFn};

use crate::error::PublishError;
use crate::publisher::{PlatformPublisher, PublishReceipt, PublishRequest};

/// Registered so Instagram gets a publish attempt; always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstagramPublisher;

#[async_trait]
impl PlatformPublisher for InstagramPublisher {
    fn platform(&self) -> PlatformName {
        PlatformName::Instagram
    }

    async fn publish(
        &self,
        request: &PublishRequest,
        _on_progress: ProgressFn<'_>,
    ) -> Result<PublishReceipt, PublishError> {
        tracing::debug!(title = %request.title, "Instagram publishing requested");
        Err(PublishError::NotImplemented(PlatformName::Instagram))
    }
}
