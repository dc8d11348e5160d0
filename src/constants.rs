//! Shared constants used across the application.

/// User agent string used for list and lookup requests.
///
/// Some paste hosts serve interstitials to non-browser agents, so this looks like
/// a regular browser.
pub const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Hosts that do not allow direct reads, so lists on them go through the proxy chain.
pub const DEFAULT_PROXY_REQUIRED_HOSTS: &[&str] = &[
    "pastebin.com",
    "rentry.co",
    "rentry.org",
    "hastebin.com",
    "justpaste.it",
];
