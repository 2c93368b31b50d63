//! Dayclip publishing platforms
//!
//! Each target platform is a [`PlatformPublisher`] that takes the transformed
//! artifact and reports its own 0–100 progress. Only YouTube talks to a real
//! API; Instagram and TikTok are registered stubs that always decline.

pub mod auth;
pub mod error;
pub mod instagram;
pub mod publisher;
pub mod registry;
pub mod tiktok;
pub mod youtube;

pub use auth::{PlatformTokens, StoredTokens, TokenStore, YoutubeOAuth, YoutubeOAuthConfig};
pub use error::PublishError;
pub use instagram::InstagramPublisher;
pub use publisher::{PlatformPublisher, PublishReceipt, PublishRequest};
pub use registry::PublisherRegistry;
pub use tiktok::TiktokPublisher;
pub use youtube::{YoutubePublisher, YoutubePublisherConfig};
