//! Removal of raw uploads and delayed removal of transformed artifacts.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    retention: Duration,
}

impl ArtifactCleaner {
    pub fn new(retention: Duration) -> Self {
        Self { retention }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Delete `path` if it exists. Returns whether a file was removed.
    pub async fn remove_if_exists(path: &Path) -> io::Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete a raw upload right away, logging instead of failing.
    pub async fn discard_upload(&self, path: &Path) {
        match Self::remove_if_exists(path).await {
            Ok(removed) => {
                tracing::debug!(path = %path.display(), removed, "Upload temp file discarded")
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove upload temp file")
            }
        }
    }

    /// Delete an artifact once the retention window has passed.
    ///
    /// Returns a JoinHandle; dropping it does not cancel the removal.
    pub fn schedule_removal(&self, path: PathBuf) -> JoinHandle<()> {
        let retention = self.retention;
        tracing::debug!(
            path = %path.display(),
            retention_secs = retention.as_secs(),
            "Artifact removal scheduled"
        );
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            match Self::remove_if_exists(&path).await {
                Ok(true) => tracing::info!(path = %path.display(), "Expired artifact removed"),
                Ok(false) => {
                    tracing::debug!(path = %path.display(), "Expired artifact already gone")
                }
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to remove expired artifact")
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_if_exists_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.mp4");
        tokio::fs::write(&path, b"data").await.expect("write");

        assert!(ArtifactCleaner::remove_if_exists(&path).await.expect("first"));
        assert!(!ArtifactCleaner::remove_if_exists(&path).await.expect("second"));
    }

    #[tokio::test]
    async fn test_discard_upload_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cleaner = ArtifactCleaner::new(Duration::from_secs(600));
        cleaner.discard_upload(&dir.path().join("missing")).await;
    }

    #[tokio::test]
    async fn test_schedule_removal_waits_for_retention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("artifact.mp4");
        std::fs::write(&path, b"data").expect("write");

        let cleaner = ArtifactCleaner::new(Duration::from_millis(300));
        let handle = cleaner.schedule_removal(path.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(path.exists());

        handle.await.expect("join");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_schedule_removal_of_already_removed_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cleaner = ArtifactCleaner::new(Duration::from_millis(10));
        cleaner
            .schedule_removal(dir.path().join("gone.mp4"))
            .await
            .expect("join");
    }
}
