//! Single-frame thumbnail extraction.

use std::path::Path;
use tokio::process::Command;

use crate::error::TransformError;
use crate::video::processor::{validate_binary_path, validate_input_file, validate_path};

const THUMBNAIL_OFFSET_SECONDS: &str = "1";
const THUMBNAIL_SIZE: &str = "1280x720";

/// Grabs one 1280x720 frame at the one-second mark of a video.
#[derive(Debug, Clone)]
pub struct ThumbnailExtractor {
    ffmpeg_path: String,
}

impl ThumbnailExtractor {
    pub fn new(ffmpeg_path: String) -> Result<Self, TransformError> {
        validate_binary_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }

    #[tracing::instrument(skip(self), fields(ffmpeg.operation = "thumbnail"))]
    pub async fn extract(&self, video_path: &Path, output_path: &Path) -> Result<(), TransformError> {
        let input = validate_input_file(video_path)?;
        validate_path(&output_path.to_string_lossy())?;

        let output = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-ss", THUMBNAIL_OFFSET_SECONDS, "-i"])
            .arg(&input)
            .args(["-frames:v", "1", "-s", THUMBNAIL_SIZE])
            .arg(output_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TransformError::Spawn {
                binary: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TransformError::Ffmpeg {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(output = %output_path.display(), "Thumbnail extracted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_unsafe_binary() {
        assert!(ThumbnailExtractor::new("ffmpeg".to_string()).is_ok());
        assert!(ThumbnailExtractor::new("ffmpeg && reboot".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_extract_missing_source() {
        let extractor = ThumbnailExtractor::new("ffmpeg".to_string()).expect("extractor");
        let result = extractor
            .extract(Path::new("/nonexistent/clip.mp4"), Path::new("/tmp/thumb.jpg"))
            .await;
        assert!(matches!(result, Err(TransformError::SourceMissing(_))));
    }
}
