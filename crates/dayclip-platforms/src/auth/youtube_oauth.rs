//! Google OAuth 2.0 client for the YouTube Data API.

use dayclip_core::PlatformName;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::tokens::PlatformTokens;
use crate::error::PublishError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/youtube.upload",
    "https://www.googleapis.com/auth/youtube.readonly",
];

#[derive(Clone)]
pub struct YoutubeOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    /// Base of the Data API, used for the channel check.
    pub api_base_url: String,
}

impl YoutubeOAuthConfig {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            api_base_url: GOOGLE_API_BASE_URL.to_string(),
        }
    }

    /// Point every endpoint at `base_url` (used against a mock server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.auth_url = format!("{}/o/oauth2/v2/auth", base_url);
        self.token_url = format!("{}/token", base_url);
        self.api_base_url = base_url.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.redirect_uri.is_some()
    }
}

impl fmt::Debug for YoutubeOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// OAuth client: consent URL, code exchange, refresh and credential check.
pub struct YoutubeOAuth {
    http_client: Client,
    config: YoutubeOAuthConfig,
}

impl fmt::Debug for YoutubeOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeOAuth")
            .field("config", &self.config)
            .finish()
    }
}

struct ClientCredentials<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

impl YoutubeOAuth {
    pub fn new(config: YoutubeOAuthConfig) -> Result<Self, PublishError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &YoutubeOAuthConfig {
        &self.config
    }

    fn credentials(&self) -> Result<ClientCredentials<'_>, PublishError> {
        match (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(ClientCredentials {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => Err(PublishError::missing_credentials(
                PlatformName::Youtube,
                "YOUTUBE_CLIENT_ID, YOUTUBE_CLIENT_SECRET and YOUTUBE_REDIRECT_URI must be set",
            )),
        }
    }

    /// Consent URL requesting offline access, so a refresh token is issued.
    pub fn authorization_url(&self) -> Result<String, PublishError> {
        let creds = self.credentials()?;
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.config.auth_url,
            urlencoding::encode(creds.client_id),
            urlencoding::encode(creds.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        ))
    }

    /// Exchange an authorization code for tokens.
    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<PlatformTokens, PublishError> {
        let creds = self.credentials()?;
        let response = self
            .token_request(&[
                ("code", code),
                ("client_id", creds.client_id),
                ("client_secret", creds.client_secret),
                ("redirect_uri", creds.redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        tracing::info!(
            has_refresh_token = response.refresh_token.is_some(),
            "YouTube authorization code exchanged"
        );

        Ok(PlatformTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or_default(),
        })
    }

    /// Trade a refresh token for a fresh access token.
    #[tracing::instrument(skip_all)]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, PublishError> {
        let creds = self.credentials()?;
        let response = self
            .token_request(&[
                ("refresh_token", refresh_token),
                ("client_id", creds.client_id),
                ("client_secret", creds.client_secret),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        Ok(response.access_token)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, PublishError> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PublishError::Api {
                platform: PlatformName::Youtube,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Whether `access_token` can read the authorized user's channel.
    pub async fn verify_access(&self, access_token: &str) -> bool {
        let url = format!("{}/youtube/v3/channels", self.config.api_base_url);
        let result = self
            .http_client
            .get(&url)
            .query(&[("part", "snippet"), ("mine", "true")])
            .bearer_auth(access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "YouTube channel check rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "YouTube channel check failed");
                false
            }
        }
    }

    /// Best-effort check that a refresh token still grants API access.
    ///
    /// Never fails; any problem is logged and reported as `false`.
    pub async fn check_auth(&self, refresh_token: Option<&str>) -> bool {
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            return false;
        };
        match self.refresh_access_token(refresh_token).await {
            Ok(access_token) => self.verify_access(&access_token).await,
            Err(e) => {
                tracing::warn!(error = %e, "Error checking YouTube auth");
                false
            }
        }
    }
}
