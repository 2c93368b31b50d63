//! Platform authorization routes (YouTube OAuth consent flow).

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use dayclip_core::{AppError, PlatformName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAuthStatus {
    pub name: PlatformName,
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub platform: Vec<PlatformAuthStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/check`: which platforms can be published to right now.
///
/// Only YouTube needs prior authorization; the other platforms report `true`.
pub async fn check_auth(State(state): State<Arc<AppState>>) -> Json<AuthCheckResponse> {
    let youtube_authenticated = match state.tokens.load().await {
        Ok(tokens) => {
            state
                .oauth
                .check_auth(tokens.refresh_token(PlatformName::Youtube))
                .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load platform tokens");
            false
        }
    };

    let platform = PlatformName::ALL
        .iter()
        .map(|&name| PlatformAuthStatus {
            name,
            is_authenticated: match name {
                PlatformName::Youtube => youtube_authenticated,
                _ => true,
            },
        })
        .collect();

    Json(AuthCheckResponse { platform })
}

/// `GET /auth/youtube`: redirect to Google's consent screen.
pub async fn youtube_authorize(
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, HttpAppError> {
    let url = state.oauth.authorization_url().map_err(|e| {
        AppError::Internal(format!("YouTube authorization is unavailable: {}", e))
    })?;
    Ok(Redirect::to(&url))
}

/// `GET /auth/youtube/callback`: exchange the code, persist tokens, return to the client.
pub async fn youtube_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, HttpAppError> {
    if let Some(error) = query.error.as_deref() {
        return Err(
            AppError::Unauthorized(format!("YouTube authorization was denied: {}", error)).into(),
        );
    }
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let tokens = state.oauth.exchange_code(code).await.map_err(|e| {
        AppError::Internal(format!("Failed to exchange YouTube authorization code: {}", e))
    })?;

    state
        .tokens
        .save_platform(PlatformName::Youtube, tokens)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save YouTube tokens: {}", e)))?;

    tracing::info!("YouTube authorization completed");

    Ok(Redirect::to(&format!(
        "{}/authenticate?platform={}",
        state.config.client_url(),
        PlatformName::Youtube.as_str()
    )))
}
