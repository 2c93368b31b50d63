//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use dayclip_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.upload_body_limit();

    let app = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/upload", post(handlers::upload::upload_video))
        .route(
            "/upload/preview/{file_name}",
            get(handlers::preview::preview_video),
        )
        .route("/events", get(handlers::events::progress_events))
        .route("/auth/check", get(handlers::auth::check_auth))
        .route("/auth/youtube", get(handlers::auth::youtube_authorize))
        .route(
            "/auth/youtube/callback",
            get(handlers::auth::youtube_callback),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.client_url() == "*" {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origin: HeaderValue = config
            .client_url()
            .parse()
            .map_err(|e| anyhow::anyhow!("CLIENT_URL is not a valid origin: {}", e))?;
        CorsLayer::new().allow_origin(origin)
    };

    Ok(cors
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}
