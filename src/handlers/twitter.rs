use regex::Regex;

use super::traits::SiteHandler;
use crate::models::ContentKind;

/// Canonical host every Twitter/X alias is rewritten to.
pub const CANONICAL_ORIGIN: &str = "https://x.com";

static PATTERNS: std::sync::LazyLock<Vec<Regex>> = std::sync::LazyLock::new(|| {
    vec![
        Regex::new(r"^(?i:https?://(?:www\.|mobile\.)?(?:twitter|x)\.com)/\w+/status/\d+")
            .unwrap(),
    ]
});

/// Captures handle and status id from a post permalink.
static PERMALINK: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(?i:https?://(?:www\.|mobile\.)?(?:twitter|x)\.com)/(\w+)/status/(\d+)").unwrap()
});

pub struct TwitterHandler;

impl TwitterHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TwitterHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteHandler for TwitterHandler {
    fn site_id(&self) -> &'static str {
        "twitter"
    }

    fn kind(&self) -> ContentKind {
        ContentKind::SocialPost
    }

    fn url_patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn priority(&self) -> i32 {
        100
    }

    fn normalize_url(&self, url: &str) -> String {
        // Handles are case-insensitive on the platform, ids are what identify the post.
        match parse_permalink(url) {
            Some((handle, id)) => format!(
                "{CANONICAL_ORIGIN}/{}/status/{id}",
                handle.to_ascii_lowercase()
            ),
            None => super::normalize::normalize_url(url),
        }
    }
}

/// Split a permalink into `(handle, status_id)`.
#[must_use]
pub fn parse_permalink(url: &str) -> Option<(&str, &str)> {
    let caps = PERMALINK.captures(url.trim())?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Rewrite a canonical post URL onto the lookup service host.
///
/// `https://x.com/jack/status/20` with base `https://api.fxtwitter.com`
/// becomes `https://api.fxtwitter.com/jack/status/20`.
#[must_use]
pub fn lookup_endpoint(canonical_url: &str, base_url: &str) -> Option<String> {
    let (handle, id) = parse_permalink(canonical_url)?;
    Some(format!(
        "{}/{handle}/status/{id}",
        base_url.trim_end_matches('/')
    ))
}
