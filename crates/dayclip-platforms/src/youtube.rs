//! YouTube publisher
//!
//! Uploads the artifact with the Data API v3 resumable protocol, then sets a
//! thumbnail grabbed from the clip. Progress: upload bytes map to 0–90, then
//! 92 before the thumbnail is extracted, 95 before it is uploaded, 100 at the end.

use async_trait::async_trait;
use bytes::Bytes;
use dayclip_core::{PlatformName, ProgressFn};
use dayclip_processing::ThumbnailExtractor;
use futures::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Client};
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::auth::youtube_oauth::GOOGLE_API_BASE_URL;
use crate::auth::{TokenStore, YoutubeOAuth};
use crate::error::PublishError;
use crate::publisher::{PlatformPublisher, PublishReceipt, PublishRequest};

const UPLOAD_SHARE: f64 = 90.0;
const THUMBNAIL_EXTRACT_PROGRESS: f64 = 92.0;
const THUMBNAIL_UPLOAD_PROGRESS: f64 = 95.0;
/// People & Blogs
const CATEGORY_ID: &str = "22";

#[derive(Debug, Clone)]
pub struct YoutubePublisherConfig {
    pub api_base_url: String,
    /// Appended to the clip title, e.g. a channel hashtag.
    pub title_suffix: String,
    pub privacy_status: String,
}

impl Default for YoutubePublisherConfig {
    fn default() -> Self {
        Self {
            api_base_url: GOOGLE_API_BASE_URL.to_string(),
            title_suffix: String::new(),
            privacy_status: "public".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
}

pub struct YoutubePublisher {
    http_client: Client,
    oauth: Arc<YoutubeOAuth>,
    tokens: Arc<TokenStore>,
    thumbnails: ThumbnailExtractor,
    config: YoutubePublisherConfig,
}

impl Debug for YoutubePublisher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("YoutubePublisher")
            .field("api_base_url", &self.config.api_base_url)
            .field("privacy_status", &self.config.privacy_status)
            .finish()
    }
}

impl YoutubePublisher {
    pub fn new(
        oauth: Arc<YoutubeOAuth>,
        tokens: Arc<TokenStore>,
        thumbnails: ThumbnailExtractor,
        config: YoutubePublisherConfig,
    ) -> Result<Self, PublishError> {
        // Uploads of long clips can take a while; only bound the connect phase.
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            oauth,
            tokens,
            thumbnails,
            config,
        })
    }

    fn api_error(status: reqwest::StatusCode, message: String) -> PublishError {
        PublishError::Api {
            platform: PlatformName::Youtube,
            status: status.as_u16(),
            message,
        }
    }

    async fn error_from(response: reqwest::Response) -> PublishError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Self::api_error(status, message)
    }

    /// Refresh token from the store, then a fresh access token.
    async fn access_token(&self) -> Result<String, PublishError> {
        let stored = self.tokens.load().await?;
        let refresh_token = stored
            .refresh_token(PlatformName::Youtube)
            .ok_or_else(|| {
                PublishError::missing_credentials(PlatformName::Youtube, "no refresh token stored")
            })?;

        self.oauth.refresh_access_token(refresh_token).await
    }

    /// Open a resumable upload session and return its upload URI.
    async fn start_session(
        &self,
        access_token: &str,
        title: &str,
        size: u64,
    ) -> Result<String, PublishError> {
        let url = format!("{}/upload/youtube/v3/videos", self.config.api_base_url);
        let metadata = json!({
            "snippet": {
                "title": title,
                "categoryId": CATEGORY_ID,
            },
            "status": {
                "privacyStatus": self.config.privacy_status,
                "selfDeclaredMadeForKids": false,
            }
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(access_token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", size)
            .json(&metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Self::api_error(
                    response.status(),
                    "resumable session response has no Location header".to_string(),
                )
            })
    }

    /// Stream the file to the session URI, reporting bytes sent as 0–90.
    async fn upload_bytes(
        &self,
        upload_uri: &str,
        access_token: &str,
        path: &Path,
        size: u64,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, PublishError> {
        let file = tokio::fs::File::open(path).await?;
        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<usize>();
        let stream = ReaderStream::new(file).inspect_ok(move |chunk: &Bytes| {
            let _ = sent_tx.send(chunk.len());
        });

        let send = self
            .http_client
            .put(upload_uri)
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, "video/mp4")
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(stream))
            .send();
        tokio::pin!(send);

        let mut sent: u64 = 0;
        let mut last_reported = -1.0;
        let response = loop {
            tokio::select! {
                Some(n) = sent_rx.recv() => {
                    sent += n as u64;
                    let percent = upload_percent(sent, size);
                    if percent > last_reported {
                        last_reported = percent;
                        on_progress(percent);
                    }
                }
                result = &mut send => break result?,
            }
        };

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let video: VideoResource = response.json().await?;
        if last_reported < UPLOAD_SHARE {
            on_progress(UPLOAD_SHARE);
        }
        Ok(video.id)
    }

    async fn set_thumbnail(
        &self,
        access_token: &str,
        video_id: &str,
        artifact: &Path,
        thumbnail: &Path,
        on_progress: ProgressFn<'_>,
    ) -> Result<(), PublishError> {
        on_progress(THUMBNAIL_EXTRACT_PROGRESS);
        self.thumbnails
            .extract(artifact, thumbnail)
            .await
            .map_err(|e| PublishError::Thumbnail(e.to_string()))?;

        on_progress(THUMBNAIL_UPLOAD_PROGRESS);
        let image = tokio::fs::read(thumbnail).await?;
        let url = format!("{}/upload/youtube/v3/thumbnails/set", self.config.api_base_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("videoId", video_id)])
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    fn full_title(&self, title: &str) -> String {
        if self.config.title_suffix.is_empty() {
            title.to_string()
        } else {
            format!("{} {}", title, self.config.title_suffix)
        }
    }
}

fn upload_percent(sent: u64, size: u64) -> f64 {
    if size == 0 {
        return UPLOAD_SHARE;
    }
    ((sent as f64 / size as f64) * UPLOAD_SHARE)
        .round()
        .min(UPLOAD_SHARE)
}

fn thumbnail_path_for(artifact: &Path) -> PathBuf {
    let file_name = format!("thumb_{}.jpg", Uuid::new_v4());
    match artifact.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[async_trait]
impl PlatformPublisher for YoutubePublisher {
    fn platform(&self) -> PlatformName {
        PlatformName::Youtube
    }

    #[tracing::instrument(skip(self, request, on_progress), fields(
        platform = "youtube",
        artifact = %request.artifact_path.display()
    ))]
    async fn publish(
        &self,
        request: &PublishRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<PublishReceipt, PublishError> {
        let access_token = self.access_token().await?;
        if !self.oauth.verify_access(&access_token).await {
            tracing::warn!("YouTube credential check failed, attempting upload anyway");
        }

        let size = tokio::fs::metadata(&request.artifact_path).await?.len();
        let title = self.full_title(&request.title);
        let upload_uri = self.start_session(&access_token, &title, size).await?;
        tracing::debug!(size, "Resumable upload session opened");

        let video_id = self
            .upload_bytes(
                &upload_uri,
                &access_token,
                &request.artifact_path,
                size,
                &mut *on_progress,
            )
            .await?;
        tracing::info!(video_id = %video_id, "YouTube upload completed");

        let thumbnail = thumbnail_path_for(&request.artifact_path);
        if let Err(e) = self
            .set_thumbnail(
                &access_token,
                &video_id,
                &request.artifact_path,
                &thumbnail,
                &mut *on_progress,
            )
            .await
        {
            tracing::warn!(error = %e, video_id = %video_id, "Thumbnail upload failed, video was published");
        }
        if let Err(e) = tokio::fs::remove_file(&thumbnail).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %thumbnail.display(), "Failed to remove thumbnail");
            }
        }
        on_progress(100.0);

        Ok(PublishReceipt {
            url: Some(format!("https://youtube.com/shorts/{}", video_id)),
            video_id: Some(video_id),
        })
    }
}
