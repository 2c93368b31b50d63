//! Errors raised by the media engine.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Source file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to probe video: {0}")]
    Probe(String),

    #[error("Failed to execute {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {status}: {stderr}")]
    Ffmpeg { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
