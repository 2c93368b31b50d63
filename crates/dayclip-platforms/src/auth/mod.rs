//! Platform authorization: persisted OAuth tokens and the YouTube OAuth client.

pub mod tokens;
pub mod youtube_oauth;

pub use tokens::{PlatformTokens, StoredTokens, TokenStore};
pub use youtube_oauth::{YoutubeOAuth, YoutubeOAuthConfig};
