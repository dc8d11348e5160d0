//! Video metadata via the oEmbed endpoint.
//!
//! Never called during batch resolution; video items are built from their URL
//! alone and metadata is fetched on request.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::handlers::youtube::watch_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author_name: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub provider_name: String,
}

/// Fetch title and channel information for a video id.
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, or an
/// unparseable body.
pub async fn fetch_video_metadata(
    client: &Client,
    oembed_url: &str,
    video_id: &str,
) -> Result<VideoMetadata> {
    let response = client
        .get(oembed_url)
        .query(&[("format", "json"), ("url", watch_url(video_id).as_str())])
        .send()
        .await
        .context("Failed to reach oEmbed endpoint")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("oEmbed request failed with status {status}");
    }

    response
        .json()
        .await
        .context("Failed to parse oEmbed response")
}
