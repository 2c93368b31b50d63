//! Errors raised by platform publishers.
//!
//! None of these are fatal to an upload run: the pipeline records the
//! platform as skipped and moves on.

use dayclip_core::PlatformName;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("{} is not authorized: {reason}", .platform.display_name())]
    MissingCredentials {
        platform: PlatformName,
        reason: String,
    },

    #[error("{} publishing is not implemented", .0.display_name())]
    NotImplemented(PlatformName),

    #[error("{} API returned {status}: {message}", .platform.display_name())]
    Api {
        platform: PlatformName,
        status: u16,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PublishError {
    pub fn missing_credentials(platform: PlatformName, reason: impl Into<String>) -> Self {
        PublishError::MissingCredentials {
            platform,
            reason: reason.into(),
        }
    }

    /// Whether re-authorizing the platform would likely fix the failure.
    pub fn requires_authorization(&self) -> bool {
        match self {
            PublishError::MissingCredentials { .. } => true,
            PublishError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_platform() {
        let err = PublishError::NotImplemented(PlatformName::Tiktok);
        assert_eq!(err.to_string(), "TikTok publishing is not implemented");

        let err = PublishError::missing_credentials(PlatformName::Youtube, "no refresh token");
        assert_eq!(
            err.to_string(),
            "YouTube is not authorized: no refresh token"
        );
    }

    #[test]
    fn test_requires_authorization() {
        assert!(PublishError::missing_credentials(PlatformName::Youtube, "x").requires_authorization());
        assert!(PublishError::Api {
            platform: PlatformName::Youtube,
            status: 401,
            message: "expired".to_string(),
        }
        .requires_authorization());
        assert!(!PublishError::NotImplemented(PlatformName::Instagram).requires_authorization());
    }
}
