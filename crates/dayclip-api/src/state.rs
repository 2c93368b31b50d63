//! Application state shared by every handler.

use dayclip_core::Config;
use dayclip_platforms::{TokenStore, YoutubeOAuth};
use dayclip_services::{ArtifactCleaner, ProgressHub, UploadPipeline};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<UploadPipeline>,
    /// Session listeners; also the pipeline's progress emitter.
    pub hub: ProgressHub,
    pub cleaner: ArtifactCleaner,
    pub oauth: Arc<YoutubeOAuth>,
    pub tokens: Arc<TokenStore>,
}

impl AppState {
    pub fn upload_dir(&self) -> &Path {
        &self.config.processing.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.config.processing.processed_dir
    }
}
