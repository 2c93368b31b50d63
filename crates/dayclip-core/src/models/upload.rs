//! Upload request and pipeline result types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use super::platform::{PlatformName, PlatformOutcome};
use crate::error::AppError;

/// Inputs accepted by one pipeline run. Immutable once built.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source_path: PathBuf,
    pub day_label: i64,
    pub requested_platforms: BTreeSet<PlatformName>,
    pub session_id: Option<String>,
}

impl UploadRequest {
    pub fn is_requested(&self, platform: PlatformName) -> bool {
        self.requested_platforms.contains(&platform)
    }

    /// Title used when publishing the clip.
    pub fn title(&self) -> String {
        format!("Day {} done", self.day_label)
    }
}

/// Result of a run whose transform stage succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// One entry per known platform, in publishing order.
    pub outcomes: Vec<PlatformOutcome>,
    pub preview_url: String,
    /// Location of the transformed artifact on disk.
    pub artifact_path: PathBuf,
}

/// HTTP body returned by `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_results: Vec<PlatformOutcome>,
    pub preview_url: String,
}

impl From<&PipelineResult> for UploadResponse {
    fn from(result: &PipelineResult) -> Self {
        Self {
            upload_results: result.outcomes.clone(),
            preview_url: result.preview_url.clone(),
        }
    }
}

/// Parse the `platforms` form field: a JSON object of platform name → bool.
///
/// Unknown platform names are ignored; only `true` entries are selected.
pub fn parse_platform_selection(raw: &str) -> Result<BTreeSet<PlatformName>, AppError> {
    let selection: HashMap<String, bool> = serde_json::from_str(raw).map_err(|e| {
        AppError::InvalidInput(format!(
            "platforms must be a JSON object of platform name to boolean: {}",
            e
        ))
    })?;

    Ok(selection
        .into_iter()
        .filter(|(_, enabled)| *enabled)
        .filter_map(|(name, _)| name.parse::<PlatformName>().ok())
        .collect())
}
