//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use dayclip_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    log_config_summary(&config);

    for dir in [
        &config.processing.upload_dir,
        &config.processing.processed_dir,
    ] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

fn set_or_missing(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "set"
    } else {
        "missing"
    }
}

fn log_config_summary(config: &Config) {
    let platforms = &config.platforms;
    tracing::info!(
        environment = %config.environment(),
        client_url = %config.client_url(),
        preview_url_base = %config.preview_url_base(),
        upload_dir = %config.processing.upload_dir.display(),
        processed_dir = %config.processing.processed_dir.display(),
        tokens_file = %platforms.tokens_file.display(),
        youtube_client_id = set_or_missing(&platforms.youtube_client_id),
        youtube_client_secret = set_or_missing(&platforms.youtube_client_secret),
        youtube_redirect_uri = set_or_missing(&platforms.youtube_redirect_uri),
        "Configuration loaded"
    );
}
