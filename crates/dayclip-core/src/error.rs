//! Error types module
//!
//! This module provides the HTTP-facing error taxonomy used throughout Dayclip.
//! Collaborator crates keep their own typed errors and convert into `AppError`
//! at the API boundary.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "MEDIA_CONVERSION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Media conversion error: {0}")]
    MediaConversionError(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MediaConversionError(_) => (
            500,
            "MEDIA_CONVERSION_ERROR",
            false,
            Some("Check that the file is a playable video and try again"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource name exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Authorize the platform and try again"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::MediaConversionError(_) => "MediaConversionError",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MediaConversionError(_) => "Failed to process video".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_media_conversion() {
        let err = AppError::MediaConversionError("ffmpeg exited with status 1".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "MEDIA_CONVERSION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to process video");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("File not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "File not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("outer"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Check request parameters and try again")
        );

        let err = AppError::Internal("token exchange failed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.suggested_action(), Some("Retry after a short delay"));
    }

    #[test]
    fn test_error_metadata_unauthorized() {
        let err = AppError::Unauthorized("YouTube authorization was denied".to_string());
        assert_eq!(err.http_status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.client_message(), "YouTube authorization was denied");
        assert_eq!(
            err.suggested_action(),
            Some("Authorize the platform and try again")
        );
        assert!(!err.is_sensitive());
    }
}
