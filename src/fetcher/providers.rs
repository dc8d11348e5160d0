//! Network access providers used to read list files.
//!
//! Each provider takes a target URL and returns the raw response body for it.
//! Providers never retry; the chain in [`super::ListFetcher`] moves on instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed response envelope: {0}")]
    Envelope(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport("timed out".to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// A way of reaching a list URL.
#[async_trait]
pub trait AccessProvider: Send + Sync {
    /// Short name used in logs and error details.
    fn name(&self) -> &'static str;

    /// Fetch `target` and return the unwrapped response body.
    async fn issue(&self, client: &Client, target: &str) -> Result<String, ProviderError>;
}

/// Plain GET against the list host.
pub struct DirectProvider;

#[async_trait]
impl AccessProvider for DirectProvider {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn issue(&self, client: &Client, target: &str) -> Result<String, ProviderError> {
        get_text(client, target).await
    }
}

/// allorigins-style proxy: wraps the upstream body in a JSON envelope.
pub struct AllOriginsProvider {
    base_url: String,
}

impl AllOriginsProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AllOriginsEnvelope {
    contents: Option<String>,
    #[serde(default)]
    status: Option<AllOriginsStatus>,
}

#[derive(Debug, Deserialize)]
struct AllOriginsStatus {
    http_code: Option<u16>,
}

#[async_trait]
impl AccessProvider for AllOriginsProvider {
    fn name(&self) -> &'static str {
        "allorigins"
    }

    async fn issue(&self, client: &Client, target: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/get?url={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(target)
        );
        let raw = get_text(client, &url).await?;
        let envelope: AllOriginsEnvelope =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Envelope(e.to_string()))?;

        // The proxy answers 200 even when the upstream did not.
        if let Some(code) = envelope.status.and_then(|s| s.http_code) {
            if !(200..300).contains(&code) {
                return Err(ProviderError::Status(code));
            }
        }

        envelope
            .contents
            .ok_or_else(|| ProviderError::Envelope("missing contents".to_string()))
    }
}

/// corsproxy-style proxy: returns the upstream body verbatim.
pub struct CorsProxyProvider {
    base_url: String,
}

impl CorsProxyProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AccessProvider for CorsProxyProvider {
    fn name(&self) -> &'static str {
        "corsproxy"
    }

    async fn issue(&self, client: &Client, target: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/?url={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(target)
        );
        get_text(client, &url).await
    }
}

async fn get_text(client: &Client, url: &str) -> Result<String, ProviderError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    Ok(response.text().await?)
}
