//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and convert their
//! errors through `AppError`, so every failure renders with the same status
//! mapping, body shape and log level.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dayclip_core::config::environment_from_env;
use dayclip_core::{AppError, ErrorMetadata, LogLevel};
use dayclip_services::PipelineError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    is_production_name(&environment_from_env())
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are never shown in production, nor for sensitive errors.
        let with_details = !is_production_env() && !app_error.is_sensitive();
        let body = ErrorResponse::from_app_error(app_error, with_details);

        (status, Json(body)).into_response()
    }
}
