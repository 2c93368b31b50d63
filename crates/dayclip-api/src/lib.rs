//! Dayclip HTTP API
//!
//! axum server in front of the upload pipeline: multipart upload, artifact
//! preview, the SSE progress channel and the platform authorization routes.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
