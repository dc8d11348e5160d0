//! URL-level deduplication.
//!
//! Two URLs are duplicates when they share a canonical form (see
//! [`crate::handlers::normalize`]). The first occurrence wins and input order
//! is preserved, since batch boundaries are positional.

use std::collections::HashSet;

use tracing::debug;

use crate::handlers::normalize;

/// Result of deduplicating a URL sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduped {
    /// Unique canonical URLs in first-seen order.
    pub urls: Vec<String>,
    /// Number of entries dropped as duplicates.
    pub removed: usize,
}

/// Remove entries whose canonical form was already seen.
#[must_use]
pub fn dedupe<S: AsRef<str>>(urls: &[S]) -> Deduped {
    let mut seen = HashSet::with_capacity(urls.len());
    let mut out = Deduped::default();

    for url in urls {
        let canonical = normalize(url.as_ref());
        if seen.insert(canonical.clone()) {
            out.urls.push(canonical);
        } else {
            out.removed += 1;
        }
    }

    if out.removed > 0 {
        debug!(unique = out.urls.len(), removed = out.removed, "Removed duplicate URLs");
    }

    out
}
