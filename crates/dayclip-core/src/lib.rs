//! Dayclip Core Library
//!
//! This crate provides core domain models, error types and configuration
//! that are shared across all Dayclip components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, PlatformConfig, ProcessingConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    PipelineResult, PlatformName, PlatformOutcome, ProgressEvent, ProgressFn, PublishStatus,
    StageWeights, UploadRequest, UploadResponse,
};
