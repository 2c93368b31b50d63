//! Collaborator wiring: transformer, publishers, pipeline.

use crate::state::AppState;
use anyhow::{Context, Result};
use dayclip_core::Config;
use dayclip_platforms::{
    InstagramPublisher, PublisherRegistry, TiktokPublisher, TokenStore, YoutubeOAuth,
    YoutubeOAuthConfig, YoutubePublisher, YoutubePublisherConfig,
};
use dayclip_processing::video::DayOverlayTransformerConfig;
use dayclip_processing::{DayOverlayTransformer, ThumbnailExtractor};
use dayclip_services::{ArtifactCleaner, ProgressHub, UploadPipeline};
use std::sync::Arc;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let processing = &config.processing;
    let platforms = &config.platforms;

    let transformer = DayOverlayTransformer::new(DayOverlayTransformerConfig {
        ffmpeg_path: processing.ffmpeg_path.clone(),
        ffprobe_path: processing.ffprobe_path.clone(),
        font_path: processing.overlay_font_path.clone(),
        output_dir: processing.processed_dir.clone(),
        target_clip_seconds: processing.target_clip_seconds,
    })
    .context("Failed to initialize video transformer")?;

    let tokens = Arc::new(TokenStore::from_env(platforms.tokens_file.clone()));
    if tokens.uses_env_tokens() {
        tracing::info!("Platform tokens loaded from environment");
    }

    let oauth = Arc::new(
        YoutubeOAuth::new(YoutubeOAuthConfig::new(
            platforms.youtube_client_id.clone(),
            platforms.youtube_client_secret.clone(),
            platforms.youtube_redirect_uri.clone(),
        ))
        .context("Failed to initialize YouTube OAuth client")?,
    );

    let thumbnails = ThumbnailExtractor::new(processing.ffmpeg_path.clone())
        .context("Failed to initialize thumbnail extractor")?;
    let youtube = YoutubePublisher::new(
        oauth.clone(),
        tokens.clone(),
        thumbnails,
        YoutubePublisherConfig {
            title_suffix: platforms.youtube_title_suffix.clone(),
            privacy_status: platforms.youtube_privacy_status.clone(),
            ..YoutubePublisherConfig::default()
        },
    )
    .context("Failed to initialize YouTube publisher")?;

    let publishers = PublisherRegistry::new()
        .with(Arc::new(youtube))
        .with(Arc::new(InstagramPublisher))
        .with(Arc::new(TiktokPublisher));
    tracing::info!(registry = ?publishers, "Publishers registered");

    let hub = ProgressHub::new();
    let pipeline = UploadPipeline::new(
        Arc::new(transformer),
        publishers,
        Arc::new(hub.clone()),
        platforms.stage_weights.clone(),
        config.preview_url_base(),
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        hub,
        cleaner: ArtifactCleaner::new(config.artifact_retention()),
        oauth,
        tokens,
    }))
}
