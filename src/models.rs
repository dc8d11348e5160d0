//! Content types produced by the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content a URL points at, derived purely from the URL's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    SocialPost,
    Video,
    Unsupported,
}

impl ContentKind {
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// A resolved, renderable feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    /// Canonical URL the item was resolved from.
    pub source_url: String,
    /// Lookup id for social posts, canonical URL for videos. Unique within a feed.
    pub id: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    SocialPost(SocialPost),
    Video(VideoRef),
}

/// A post returned by the lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(default)]
    pub url: String,
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub author: Author,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    /// Quoted post. Only one level is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Box<SocialPost>>,
}

impl SocialPost {
    /// Drop quotes nested below the first level.
    #[must_use]
    pub fn flatten_quotes(mut self) -> Self {
        if let Some(quote) = self.quote.as_mut() {
            quote.quote = None;
        }
        self
    }

    /// Posting time, from the service's `Wed Jul 23 10:00:00 +0000 2025` format
    /// or RFC 3339.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_str(&self.created_at, "%a %b %d %H:%M:%S %z %Y")
            .or_else(|_| DateTime::parse_from_rfc3339(&self.created_at))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<MediaVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaVideo {
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub variants: Vec<VideoVariant>,
}

impl MediaVideo {
    /// Highest-bitrate mp4 variant, falling back to the primary URL.
    #[must_use]
    pub fn best_variant_url(&self) -> &str {
        self.variants
            .iter()
            .filter(|v| v.content_type == "video/mp4")
            .max_by_key(|v| v.bitrate.unwrap_or(0))
            .map_or(self.url.as_str(), |v| v.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVariant {
    pub content_type: String,
    pub url: String,
    #[serde(default)]
    pub bitrate: Option<u64>,
}

/// A video reference synthesized from its URL without any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub video_id: String,
    pub watch_url: String,
    pub embed_url: String,
    pub thumbnail_url: String,
}
