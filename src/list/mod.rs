//! Turning raw list text into the canonical URL sequence a feed is built from.

pub mod parser;

pub use parser::{parse, parse_nonempty, ParseError};

use crate::dedup::{dedupe, Deduped};
use crate::handlers::classify;

/// URLs from the built-in demo list, used when no list is supplied.
pub const DEFAULT_LIST: &[&str] = &[
    "https://twitter.com/jack/status/20",
    "https://twitter.com/elonmusk/status/1585841080431321088",
    "https://twitter.com/joely7758521/status/1947472826489016745",
    "https://x.com/niccruzpatane/status/1946967976005042231",
    "https://x.com/SpaceX/status/1946437942265987384",
];

/// The built-in list as raw text, so it goes through the same parser as user lists.
#[must_use]
pub fn default_list_text() -> String {
    DEFAULT_LIST.join("\n")
}

/// Parse, drop unsupported URLs, and deduplicate.
///
/// # Errors
///
/// Returns [`ParseError::NoValidUrls`] when nothing usable remains.
pub fn prepare(raw: &str) -> Result<Deduped, ParseError> {
    let candidates: Vec<String> = parse_nonempty(raw)?
        .into_iter()
        .filter(|url| classify(url).is_supported())
        .collect();
    if candidates.is_empty() {
        return Err(ParseError::NoValidUrls);
    }
    Ok(dedupe(&candidates))
}
