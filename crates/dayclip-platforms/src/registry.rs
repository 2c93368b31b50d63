//! Publisher registry keyed by platform

use dayclip_core::PlatformName;
use std::collections::HashMap;
use std::sync::Arc;

use crate::publisher::PlatformPublisher;

/// Registry of available publishers.
///
/// Built once at startup and shared read-only afterwards, so lookups need no locking.
#[derive(Clone, Default)]
pub struct PublisherRegistry {
    publishers: HashMap<PlatformName, Arc<dyn PlatformPublisher>>,
}

impl PublisherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher under its own platform, returning any publisher it replaced.
    pub fn register(
        &mut self,
        publisher: Arc<dyn PlatformPublisher>,
    ) -> Option<Arc<dyn PlatformPublisher>> {
        let platform = publisher.platform();
        tracing::debug!(platform = %platform, "Registering publisher");
        self.publishers.insert(platform, publisher)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, publisher: Arc<dyn PlatformPublisher>) -> Self {
        self.register(publisher);
        self
    }

    pub fn get(&self, platform: PlatformName) -> Option<Arc<dyn PlatformPublisher>> {
        self.publishers.get(&platform).cloned()
    }

    pub fn contains(&self, platform: PlatformName) -> bool {
        self.publishers.contains_key(&platform)
    }

    /// Registered platforms, in publishing order.
    pub fn platforms(&self) -> Vec<PlatformName> {
        PlatformName::ALL
            .into_iter()
            .filter(|p| self.publishers.contains_key(p))
            .collect()
    }
}

impl std::fmt::Debug for PublisherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}
