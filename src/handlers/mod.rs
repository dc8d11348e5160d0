//! URL classification and canonicalisation.
//!
//! Every supported platform is a [`SiteHandler`] in the global registry. The free
//! functions here are the pure entry points used by the list parser, the
//! deduplicator and the batch resolver.

mod normalize;
mod registry;
mod traits;

// Site handlers
pub mod twitter;
pub mod youtube;

pub use normalize::{host_of, normalize_url};
pub use registry::HandlerRegistry;
pub use traits::SiteHandler;

use crate::models::ContentKind;

/// Global handler registry.
pub static HANDLERS: std::sync::LazyLock<HandlerRegistry> = std::sync::LazyLock::new(|| {
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(twitter::TwitterHandler::new()));
    registry.register(Box::new(youtube::YouTubeHandler::new()));
    registry
});

/// Decide what kind of content a URL denotes.
#[must_use]
pub fn classify(url: &str) -> ContentKind {
    HANDLERS
        .find_handler(url.trim())
        .map_or(ContentKind::Unsupported, |h| h.kind())
}

/// Canonical form of a URL, used both for lookups and for deduplication.
///
/// Supported URLs collapse every domain alias onto one host; anything else only
/// gets generic cleanup.
#[must_use]
pub fn normalize(url: &str) -> String {
    let url = url.trim();
    HANDLERS
        .find_handler(url)
        .map_or_else(|| normalize_url(url), |h| h.normalize_url(url))
}

/// Longest supported URL at the start of `text`, if any.
#[must_use]
pub fn extract_url(text: &str) -> Option<&str> {
    HANDLERS.extract(text)
}
