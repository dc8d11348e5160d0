use thiserror::Error;
use tracing::debug;

use crate::handlers::extract_url;

/// Line prefixes that mark a comment.
pub const COMMENT_MARKERS: &[&str] = &["#", "//"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no valid URLs found")]
    NoValidUrls,
}

/// Turn raw list text into the ordered candidate URLs it contains.
///
/// Blank lines and comment lines are skipped; on every other line the longest
/// supported URL at the start of the line is kept and any trailing annotation is
/// ignored. Lines without a supported URL are dropped, never fatal.
#[must_use]
pub fn parse(raw: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut skipped = 0usize;

    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || COMMENT_MARKERS.iter().any(|m| line.starts_with(m)) {
            continue;
        }
        match extract_url(line) {
            Some(url) => urls.push(url.to_string()),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(kept = urls.len(), skipped, "Dropped lines without a supported URL");
    }

    urls
}

/// Like [`parse`], but an empty result is an error.
///
/// # Errors
///
/// Returns [`ParseError::NoValidUrls`] when no line holds a supported URL.
pub fn parse_nonempty(raw: &str) -> Result<Vec<String>, ParseError> {
    let urls = parse(raw);
    if urls.is_empty() {
        Err(ParseError::NoValidUrls)
    } else {
        Ok(urls)
    }
}
