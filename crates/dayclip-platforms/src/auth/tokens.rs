//! OAuth token persistence.
//!
//! Tokens supplied through the environment take priority; otherwise they are
//! read from a JSON file shaped as
//! `{ "youtube": { "access_token": "...", "refresh_token": "..." }, ... }`.
//!
//! Token values must never be logged.

use dayclip_core::PlatformName;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::PublishError;

/// Access/refresh token pair for one platform.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl PlatformTokens {
    /// Refresh token, if one is present.
    pub fn refresh_token(&self) -> Option<&str> {
        Some(self.refresh_token.as_str()).filter(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for PlatformTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformTokens")
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Tokens for every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<PlatformTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<PlatformTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<PlatformTokens>,
}

impl StoredTokens {
    pub fn get(&self, platform: PlatformName) -> Option<&PlatformTokens> {
        match platform {
            PlatformName::Youtube => self.youtube.as_ref(),
            PlatformName::Instagram => self.instagram.as_ref(),
            PlatformName::Tiktok => self.tiktok.as_ref(),
        }
    }

    pub fn set(&mut self, platform: PlatformName, tokens: PlatformTokens) {
        let slot = match platform {
            PlatformName::Youtube => &mut self.youtube,
            PlatformName::Instagram => &mut self.instagram,
            PlatformName::Tiktok => &mut self.tiktok,
        };
        *slot = Some(tokens);
    }

    /// Refresh token for `platform`, if present and non-empty.
    pub fn refresh_token(&self, platform: PlatformName) -> Option<&str> {
        self.get(platform).and_then(PlatformTokens::refresh_token)
    }

    /// Snapshot of `<PLATFORM>_ACCESS_TOKEN` / `<PLATFORM>_REFRESH_TOKEN` variables.
    ///
    /// Only taken into account when `YOUTUBE_REFRESH_TOKEN` is set, mirroring how
    /// deployments without a writable filesystem are configured.
    pub fn from_env() -> Option<Self> {
        let youtube_refresh = env::var("YOUTUBE_REFRESH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())?;

        let read = |platform: PlatformName| {
            let prefix = platform.as_str().to_uppercase();
            PlatformTokens {
                access_token: env::var(format!("{}_ACCESS_TOKEN", prefix)).unwrap_or_default(),
                refresh_token: env::var(format!("{}_REFRESH_TOKEN", prefix)).unwrap_or_default(),
            }
        };

        Some(Self {
            youtube: Some(PlatformTokens {
                refresh_token: youtube_refresh,
                ..read(PlatformName::Youtube)
            }),
            instagram: Some(read(PlatformName::Instagram)),
            tiktok: Some(read(PlatformName::Tiktok)),
        })
    }
}

/// Loads and saves [`StoredTokens`].
#[derive(Debug)]
pub struct TokenStore {
    file_path: PathBuf,
    env_tokens: Option<StoredTokens>,
    write_lock: Mutex<()>,
}

impl TokenStore {
    pub fn new(file_path: impl Into<PathBuf>, env_tokens: Option<StoredTokens>) -> Self {
        Self {
            file_path: file_path.into(),
            env_tokens,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by `file_path`, preferring tokens found in the environment.
    pub fn from_env(file_path: impl Into<PathBuf>) -> Self {
        Self::new(file_path, StoredTokens::from_env())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn uses_env_tokens(&self) -> bool {
        self.env_tokens.is_some()
    }

    /// Current tokens: environment first, then the file, else empty.
    pub async fn load(&self) -> Result<StoredTokens, PublishError> {
        if let Some(tokens) = &self.env_tokens {
            tracing::debug!("Loading tokens from environment variables");
            return Ok(tokens.clone());
        }
        self.load_file().await
    }

    async fn load_file(&self) -> Result<StoredTokens, PublishError> {
        match tokio::fs::read(&self.file_path).await {
            Ok(bytes) => {
                tracing::debug!(path = %self.file_path.display(), "Loading tokens from file");
                serde_json::from_slice(&bytes)
                    .map_err(|e| PublishError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.file_path.display(), "No tokens file found");
                Ok(StoredTokens::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the tokens of one platform, keeping the others in the file untouched.
    ///
    /// An empty refresh token in `tokens` keeps the previously stored one.
    pub async fn save_platform(
        &self,
        platform: PlatformName,
        mut tokens: PlatformTokens,
    ) -> Result<(), PublishError> {
        let _guard = self.write_lock.lock().await;

        let mut stored = self.load_file().await?;
        if tokens.refresh_token.is_empty() {
            if let Some(previous) = stored.get(platform) {
                tokens.refresh_token = previous.refresh_token.clone();
            }
        }
        stored.set(platform, tokens);

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| PublishError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        tokio::fs::write(&self.file_path, json).await?;

        if self.env_tokens.is_some() {
            tracing::warn!(
                platform = %platform,
                path = %self.file_path.display(),
                "Tokens saved to file, but environment tokens take priority on load"
            );
        } else {
            tracing::info!(platform = %platform, path = %self.file_path.display(), "Tokens saved");
        }
        Ok(())
    }
}
