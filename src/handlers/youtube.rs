use regex::Regex;

use super::traits::SiteHandler;
use crate::models::{ContentKind, VideoRef};

static PATTERNS: std::sync::LazyLock<Vec<Regex>> = std::sync::LazyLock::new(|| {
    vec![
        Regex::new(r"^(?i:https?://(?:www\.|m\.)?youtube\.com)/watch\?(?:[^\s#]*&)?v=[A-Za-z0-9_-]{11}")
            .unwrap(),
        Regex::new(r"^(?i:https?://youtu\.be)/[A-Za-z0-9_-]{11}").unwrap(),
    ]
});

/// Captures the 11-character video id from either supported shape.
static VIDEO_ID: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i:youtube\.com/watch\?(?:[^\s#]*&)?v=|youtu\.be/)([A-Za-z0-9_-]{11})").unwrap()
});

pub struct YouTubeHandler;

impl YouTubeHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for YouTubeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteHandler for YouTubeHandler {
    fn site_id(&self) -> &'static str {
        "youtube"
    }

    fn kind(&self) -> ContentKind {
        ContentKind::Video
    }

    fn url_patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn priority(&self) -> i32 {
        100
    }

    fn normalize_url(&self, url: &str) -> String {
        extract_video_id(url).map_or_else(
            || super::normalize::normalize_url(url),
            |id| watch_url(&id),
        )
    }
}

/// Extract the video id from a watch page or short link.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check that a string has the shape of a video id.
#[must_use]
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Build a video reference from a URL without any network access.
#[must_use]
pub fn video_ref(url: &str) -> Option<VideoRef> {
    let id = extract_video_id(url)?;
    Some(VideoRef {
        watch_url: watch_url(&id),
        embed_url: format!("https://www.youtube-nocookie.com/embed/{id}"),
        thumbnail_url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
        video_id: id,
    })
}
