//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
}

pub async fn root() -> &'static str {
    "Server is running"
}

pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse { status: "ok" })
}
