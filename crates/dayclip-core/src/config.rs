//! Configuration module
//!
//! This module provides configuration structures for the HTTP server, the media
//! processing collaborators and the publishing platforms.

use std::env;
use std::path::PathBuf;

use crate::models::StageWeights;

// Common constants
const SERVER_PORT: u16 = 5000;
const CLIENT_URL: &str = "http://localhost:5174";
const MAX_VIDEO_SIZE_MB: usize = 500;
const ARTIFACT_RETENTION_SECS: u64 = 600;
const TARGET_CLIP_SECONDS: f64 = 15.0;
const OVERLAY_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
const BYTES_PER_MB: usize = 1024 * 1024;

/// Room for the non-file multipart fields on top of the video itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Deployment environment name from `ENVIRONMENT`, then `APP_ENV`.
pub fn environment_from_env() -> String {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// `None` when the byte count does not fit in `usize`.
fn megabytes_to_bytes(mb: usize) -> Option<usize> {
    mb.checked_mul(BYTES_PER_MB)
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    /// Browser origin allowed by CORS, also the redirect target after OAuth consent.
    pub client_url: String,
    /// Public base URL of this server, used to build preview links.
    pub public_base_url: String,
    pub environment: String,
}

/// Media processing configuration
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub overlay_font_path: String,
    pub target_clip_seconds: f64,
    pub max_video_size_bytes: usize,
    pub artifact_retention_secs: u64,
}

/// Publishing platforms configuration
#[derive(Clone, Debug)]
pub struct PlatformConfig {
    pub stage_weights: StageWeights,
    pub tokens_file: PathBuf,
    pub youtube_client_id: Option<String>,
    pub youtube_client_secret: Option<String>,
    pub youtube_redirect_uri: Option<String>,
    pub youtube_title_suffix: String,
    pub youtube_privacy_status: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub processing: ProcessingConfig,
    pub platforms: PlatformConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = environment_from_env();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let client_url = env::var("CLIENT_URL").unwrap_or_else(|_| CLIENT_URL.to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));

        let base = BaseConfig {
            server_port,
            client_url: client_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            environment,
        };

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);
        let max_video_size_bytes = megabytes_to_bytes(max_video_size_mb).ok_or_else(|| {
            anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large: {}", max_video_size_mb)
        })?;

        let processing = ProcessingConfig {
            upload_dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into())),
            processed_dir: PathBuf::from(
                env::var("PROCESSED_DIR").unwrap_or_else(|_| "processed".into()),
            ),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            overlay_font_path: env::var("OVERLAY_FONT_PATH")
                .unwrap_or_else(|_| OVERLAY_FONT_PATH.to_string()),
            target_clip_seconds: env::var("TARGET_CLIP_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(TARGET_CLIP_SECONDS),
            max_video_size_bytes,
            artifact_retention_secs: env::var("ARTIFACT_RETENTION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(ARTIFACT_RETENTION_SECS),
        };

        let stage_weights = match env::var("PLATFORM_WEIGHTS") {
            Ok(raw) => StageWeights::parse(&raw)
                .map_err(|e| anyhow::anyhow!("PLATFORM_WEIGHTS is invalid: {}", e))?,
            Err(_) => StageWeights::default(),
        };

        let platforms = PlatformConfig {
            stage_weights,
            tokens_file: PathBuf::from(
                env::var("TOKENS_FILE").unwrap_or_else(|_| "tokens.json".into()),
            ),
            youtube_client_id: non_empty_var("YOUTUBE_CLIENT_ID"),
            youtube_client_secret: non_empty_var("YOUTUBE_CLIENT_SECRET"),
            youtube_redirect_uri: non_empty_var("YOUTUBE_REDIRECT_URI"),
            youtube_title_suffix: env::var("YOUTUBE_TITLE_SUFFIX").unwrap_or_default(),
            youtube_privacy_status: env::var("YOUTUBE_PRIVACY_STATUS")
                .unwrap_or_else(|_| "public".to_string()),
        };

        let config = Config {
            base,
            processing,
            platforms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("PORT must be non-zero"));
        }
        if self.processing.target_clip_seconds <= 0.0 {
            return Err(anyhow::anyhow!("TARGET_CLIP_SECONDS must be positive"));
        }
        if self.processing.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be positive"));
        }
        if self
            .processing
            .max_video_size_bytes
            .checked_add(MULTIPART_OVERHEAD_BYTES)
            .is_none()
        {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"));
        }
        if !["public", "unlisted", "private"].contains(&self.platforms.youtube_privacy_status.as_str())
        {
            return Err(anyhow::anyhow!(
                "YOUTUBE_PRIVACY_STATUS must be one of public, unlisted, private"
            ));
        }
        self.platforms
            .stage_weights
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid stage weights: {}", e))?;
        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn client_url(&self) -> &str {
        &self.base.client_url
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    /// URL under which a processed artifact is served.
    pub fn preview_url_base(&self) -> String {
        format!("{}/upload/preview", self.base.public_base_url)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.processing.max_video_size_bytes
    }

    /// Request body limit for an upload: the video plus its form fields.
    pub fn upload_body_limit(&self) -> usize {
        self.processing
            .max_video_size_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    pub fn artifact_retention(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.processing.artifact_retention_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 5000,
                client_url: CLIENT_URL.to_string(),
                public_base_url: "http://localhost:5000".to_string(),
                environment: "development".to_string(),
            },
            processing: ProcessingConfig {
                upload_dir: PathBuf::from("uploads"),
                processed_dir: PathBuf::from("processed"),
                ffmpeg_path: "ffmpeg".to_string(),
                ffprobe_path: "ffprobe".to_string(),
                overlay_font_path: OVERLAY_FONT_PATH.to_string(),
                target_clip_seconds: TARGET_CLIP_SECONDS,
                max_video_size_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
                artifact_retention_secs: ARTIFACT_RETENTION_SECS,
            },
            platforms: PlatformConfig {
                stage_weights: StageWeights::default(),
                tokens_file: PathBuf::from("tokens.json"),
                youtube_client_id: None,
                youtube_client_secret: None,
                youtube_redirect_uri: None,
                youtube_title_suffix: String::new(),
                youtube_privacy_status: "public".to_string(),
            },
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.preview_url_base(),
            "http://localhost:5000/upload/preview"
        );
        assert_eq!(config.artifact_retention().as_secs(), 600);
    }

    #[test]
    fn test_megabytes_to_bytes_detects_overflow() {
        assert_eq!(megabytes_to_bytes(500), Some(500 * 1024 * 1024));
        assert_eq!(megabytes_to_bytes(usize::MAX), None);
        assert_eq!(megabytes_to_bytes(usize::MAX / BYTES_PER_MB + 1), None);
    }

    #[test]
    fn test_validate_rejects_unbounded_video_size() {
        let mut config = test_config();
        config.processing.max_video_size_bytes = usize::MAX;
        assert!(config.validate().is_err());
        assert_eq!(config.upload_body_limit(), usize::MAX);

        config.processing.max_video_size_bytes = 0;
        assert!(config.validate().is_err());

        config.processing.max_video_size_bytes = 10 * BYTES_PER_MB;
        assert!(config.validate().is_ok());
        assert_eq!(
            config.upload_body_limit(),
            10 * BYTES_PER_MB + MULTIPART_OVERHEAD_BYTES
        );
    }

    #[test]
    fn test_validate_rejects_bad_privacy_status() {
        let mut config = test_config();
        config.platforms.youtube_privacy_status = "friends".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_weights() {
        let mut config = test_config();
        config.platforms.stage_weights = StageWeights::parse("tiktok=60").expect("parse");
        assert!(config.validate().is_err());
    }
}
