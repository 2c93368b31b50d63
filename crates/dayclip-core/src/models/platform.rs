//! Publishing platforms and per-platform outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target platform a processed clip can be published to.
///
/// The set is closed: adding a platform means adding a variant here plus a
/// publisher implementation in `dayclip-platforms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformName {
    Youtube,
    Instagram,
    Tiktok,
}

impl PlatformName {
    /// Every known platform, in publishing order.
    pub const ALL: [PlatformName; 3] = [
        PlatformName::Youtube,
        PlatformName::Instagram,
        PlatformName::Tiktok,
    ];

    /// Wire identifier, also used in progress event codes (`upload-<id>-start`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformName::Youtube => "youtube",
            PlatformName::Instagram => "instagram",
            PlatformName::Tiktok => "tiktok",
        }
    }

    /// Human readable name for progress messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformName::Youtube => "YouTube",
            PlatformName::Instagram => "Instagram",
            PlatformName::Tiktok => "TikTok",
        }
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformName {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(PlatformName::Youtube),
            "instagram" => Ok(PlatformName::Instagram),
            "tiktok" => Ok(PlatformName::Tiktok),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Final disposition of one platform within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Finished,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub platform: PlatformName,
    pub status: PublishStatus,
}

impl PlatformOutcome {
    pub fn finished(platform: PlatformName) -> Self {
        Self {
            platform,
            status: PublishStatus::Finished,
        }
    }

    pub fn skipped(platform: PlatformName) -> Self {
        Self {
            platform,
            status: PublishStatus::Skipped,
        }
    }
}
