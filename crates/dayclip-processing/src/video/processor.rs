//! Video processor - metadata extraction and path validation

use crate::error::TransformError;
use crate::metadata::VideoMetadata;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<(), TransformError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(TransformError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(TransformError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Validate a binary path configured by the operator (e.g. `ffmpeg`, `/usr/bin/ffprobe`).
pub(crate) fn validate_binary_path(binary: &str) -> Result<(), TransformError> {
    validate_path(binary)?;
    if binary.is_empty()
        || !binary.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(TransformError::InvalidPath(format!(
            "Binary path contains unsafe characters: {}",
            binary
        )));
    }
    Ok(())
}

/// Validate and canonicalize an existing input file
pub(crate) fn validate_input_file(path: &Path) -> Result<PathBuf, TransformError> {
    validate_path(&path.to_string_lossy())?;
    if !path.exists() {
        return Err(TransformError::SourceMissing(path.to_path_buf()));
    }
    Ok(path.canonicalize()?)
}

#[derive(Debug, Clone)]
pub struct VideoProcessor {
    ffprobe_path: String,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: String) -> Result<Self, TransformError> {
        validate_binary_path(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }

    /// Extract metadata from an existing file
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn extract_metadata_from_path(
        &self,
        video_path: &Path,
    ) -> Result<VideoMetadata, TransformError> {
        let start = std::time::Instant::now();

        let validated_path = validate_input_file(video_path)?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(&validated_path)
            .output()
            .await
            .map_err(|source| TransformError::Spawn {
                binary: self.ffprobe_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TransformError::Probe(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let metadata = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = metadata.duration,
            width = metadata.width,
            height = metadata.height,
            codec = %metadata.codec,
            has_audio = metadata.has_audio,
            "Video probe completed"
        );

        Ok(metadata)
    }
}

/// Parse ffprobe's `-print_format json -show_format -show_streams` output.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata, TransformError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| TransformError::Probe(format!("Failed to parse ffprobe output: {}", e)))?;

    let streams = probe_data["streams"]
        .as_array()
        .ok_or_else(|| TransformError::Probe("No streams found".to_string()))?;

    let stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or_else(|| TransformError::Probe("No video stream found".to_string()))?;

    let has_audio = streams
        .iter()
        .any(|s| s["codec_type"].as_str() == Some("audio"));

    let format = &probe_data["format"];

    let duration = format["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| TransformError::Probe("Could not parse duration".to_string()))?;

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| TransformError::Probe("Could not parse width".to_string()))? as u32;

    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| TransformError::Probe("Could not parse height".to_string()))?
        as u32;

    let codec = stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    let framerate = stream["r_frame_rate"].as_str().and_then(|r| {
        let (num, den) = r.split_once('/')?;
        let num: f32 = num.parse().ok()?;
        let den: f32 = den.parse().ok()?;
        if den != 0.0 {
            Some(num / den)
        } else {
            None
        }
    });

    Ok(VideoMetadata {
        duration,
        width,
        height,
        codec,
        framerate,
        has_audio,
    })
}
