//! Test helpers: build AppState and router around fake collaborators.
//!
//! Run from workspace root: `cargo test -p dayclip-api`.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use dayclip_api::setup::routes;
use dayclip_api::state::AppState;
use dayclip_core::{BaseConfig, Config, PlatformConfig, ProcessingConfig, StageWeights};
use dayclip_platforms::{
    InstagramPublisher, PublisherRegistry, TiktokPublisher, TokenStore, YoutubeOAuth,
    YoutubeOAuthConfig,
};
use dayclip_processing::MediaTransform;
use dayclip_services::{ArtifactCleaner, ProgressHub, UploadPipeline};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const CLIENT_URL: &str = "http://localhost:5174";
pub const PUBLIC_BASE_URL: &str = "http://localhost:5000";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.state.hub
    }

    /// Number of files currently in `dir`.
    pub fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Collaborators injected into the app under test.
pub struct TestAppOptions {
    pub transform: fn(&Path) -> Arc<dyn MediaTransform>,
    pub publishers: PublisherRegistry,
    pub oauth: YoutubeOAuthConfig,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            transform: fakes::succeeding_transform,
            publishers: PublisherRegistry::new()
                .with(Arc::new(fakes::FakePublisher::succeeding(
                    dayclip_core::PlatformName::Youtube,
                )))
                .with(Arc::new(InstagramPublisher))
                .with(Arc::new(TiktokPublisher)),
            oauth: YoutubeOAuthConfig::new(None, None, None),
        }
    }
}

pub fn create_test_config(root: &Path) -> Config {
    Config {
        base: BaseConfig {
            server_port: 5000,
            client_url: CLIENT_URL.to_string(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
            environment: "test".to_string(),
        },
        processing: ProcessingConfig {
            upload_dir: root.join("uploads"),
            processed_dir: root.join("processed"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            overlay_font_path: "DejaVuSans-Bold.ttf".to_string(),
            target_clip_seconds: 15.0,
            max_video_size_bytes: 10 * 1024 * 1024,
            artifact_retention_secs: 600,
        },
        platforms: PlatformConfig {
            stage_weights: StageWeights::default(),
            tokens_file: root.join("tokens.json"),
            youtube_client_id: None,
            youtube_client_secret: None,
            youtube_redirect_uri: None,
            youtube_title_suffix: String::new(),
            youtube_privacy_status: "public".to_string(),
        },
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path());
    std::fs::create_dir_all(&config.processing.upload_dir).expect("create upload dir");
    std::fs::create_dir_all(&config.processing.processed_dir).expect("create processed dir");

    let hub = ProgressHub::new();
    let pipeline = UploadPipeline::new(
        (options.transform)(&config.processing.processed_dir),
        options.publishers,
        Arc::new(hub.clone()),
        config.platforms.stage_weights.clone(),
        config.preview_url_base(),
    );

    let state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        hub,
        cleaner: ArtifactCleaner::new(Duration::from_secs(600)),
        oauth: Arc::new(YoutubeOAuth::new(options.oauth).expect("oauth client")),
        tokens: Arc::new(TokenStore::new(config.platforms.tokens_file.clone(), None)),
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone()).expect("routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
