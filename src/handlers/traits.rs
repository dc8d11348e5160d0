use regex::Regex;

use crate::models::ContentKind;

/// Trait for site-specific URL handlers.
///
/// Handlers are pure: they recognise URL shapes and rewrite them, and never
/// perform I/O.
pub trait SiteHandler: Send + Sync {
    /// Unique identifier for this handler.
    fn site_id(&self) -> &'static str;

    /// Kind of content every URL accepted by this handler denotes.
    fn kind(&self) -> ContentKind;

    /// URL patterns this handler matches. Each is anchored at the start.
    fn url_patterns(&self) -> &[Regex];

    /// Check if this handler can handle the given URL.
    fn can_handle(&self, url: &str) -> bool {
        self.url_patterns().iter().any(|p| p.is_match(url))
    }

    /// Longest prefix of `text` that is a URL this handler accepts.
    ///
    /// Anything after the URL (annotations, trailing words) is ignored.
    fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.url_patterns()
            .iter()
            .filter_map(|p| p.find(text))
            .filter(|m| m.start() == 0)
            .map(|m| {
                let rest = &text[m.end()..];
                // Keep query strings and sub-paths that belong to the same URL token.
                if rest.starts_with(['/', '?', '&', '#']) {
                    let end = rest
                        .find(char::is_whitespace)
                        .map_or(text.len(), |i| m.end() + i);
                    &text[..end]
                } else {
                    m.as_str()
                }
            })
            .max_by_key(|s| s.len())
    }

    /// Rewrite a URL accepted by this handler into its canonical form.
    fn normalize_url(&self, url: &str) -> String {
        super::normalize::normalize_url(url)
    }

    /// Priority for handler selection (higher = preferred).
    fn priority(&self) -> i32 {
        0
    }
}
