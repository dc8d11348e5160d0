//! Batch resolution of a deduplicated URL list.
//!
//! The list is consumed in fixed-size, positional batches. Every URL of a batch
//! is resolved concurrently and independently; a failed lookup only shows up in
//! the counters. Results are merged in list order, and an item whose id is
//! already in the feed is not added twice.

use std::collections::HashSet;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::dedup::Deduped;
use crate::handlers::{classify, normalize, youtube};
use crate::lookup::{LookupError, LookupResolver};
use crate::models::{ContentItem, ContentKind, Payload};

/// Running counters for one adopted list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// URLs whose resolution was attempted.
    pub attempted: usize,
    /// Items added to the feed.
    pub succeeded: usize,
    /// URLs whose resolution failed.
    pub failed: usize,
    /// URLs dropped as duplicates, plus resolved items whose id was already present.
    pub duplicates_removed: usize,
}

/// Progress through one adopted list.
#[derive(Debug, Clone, Default)]
pub struct BatchState {
    url_list: Vec<String>,
    cursor: usize,
    accumulated: Vec<ContentItem>,
    seen_ids: HashSet<String>,
    stats: BatchStats,
    exhausted: bool,
}

/// Settled results of one batch, not yet merged.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Batch index the results were computed for.
    pub cursor: usize,
    /// One entry per URL of the batch, in list order.
    pub results: Vec<Result<ContentItem, LookupError>>,
}

impl BatchState {
    /// Start a fresh state for a deduplicated list.
    #[must_use]
    pub fn new(list: Deduped) -> Self {
        Self {
            exhausted: list.urls.is_empty(),
            url_list: list.urls,
            stats: BatchStats {
                duplicates_removed: list.removed,
                ..BatchStats::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn url_list(&self) -> &[String] {
        &self.url_list
    }

    /// Index of the next batch to resolve.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.accumulated
    }

    #[must_use]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// URLs of the next batch. Empty once the list is consumed.
    #[must_use]
    pub fn next_slice(&self, batch_size: usize) -> &[String] {
        let start = self.cursor.saturating_mul(batch_size).min(self.url_list.len());
        let end = start.saturating_add(batch_size).min(self.url_list.len());
        &self.url_list[start..end]
    }

    /// Mark the list as fully consumed.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    /// Append items whose id is not already present, keeping their order.
    ///
    /// Returns how many were added.
    pub fn merge(&mut self, items: impl IntoIterator<Item = ContentItem>) -> usize {
        let mut added = 0;
        for item in items {
            if self.seen_ids.insert(item.id.clone()) {
                self.accumulated.push(item);
                added += 1;
            } else {
                self.stats.duplicates_removed += 1;
            }
        }
        self.stats.succeeded += added;
        added
    }

    /// Merge a settled batch and advance the cursor.
    ///
    /// Outcomes computed for a different batch index are ignored and `false` is
    /// returned.
    pub fn apply(&mut self, outcome: BatchOutcome, batch_size: usize) -> bool {
        if outcome.cursor != self.cursor {
            warn!(
                expected = self.cursor,
                got = outcome.cursor,
                "Ignoring batch computed for a different position"
            );
            return false;
        }

        let end = self
            .cursor
            .saturating_add(1)
            .saturating_mul(batch_size)
            .min(self.url_list.len());

        self.stats.attempted += outcome.results.len();
        let mut successes = Vec::with_capacity(outcome.results.len());
        for result in outcome.results {
            match result {
                Ok(item) => successes.push(item),
                Err(_) => self.stats.failed += 1,
            }
        }
        let added = self.merge(successes);

        self.cursor += 1;
        self.exhausted = end >= self.url_list.len();

        info!(
            batch = outcome.cursor,
            added,
            total = self.accumulated.len(),
            exhausted = self.exhausted,
            "Merged batch"
        );
        true
    }
}

/// Resolve one URL to a content item.
///
/// Videos are built from the URL alone; social posts go through `resolver`.
///
/// # Errors
///
/// Returns [`LookupError`] if the URL is unsupported or the lookup fails.
pub async fn resolve_one(
    url: &str,
    resolver: &dyn LookupResolver,
) -> Result<ContentItem, LookupError> {
    let canonical = normalize(url);
    match classify(&canonical) {
        ContentKind::Video => {
            let video = youtube::video_ref(&canonical)
                .ok_or_else(|| LookupError::new(format!("unrecognised video URL: {canonical}")))?;
            Ok(ContentItem {
                kind: ContentKind::Video,
                id: canonical.clone(),
                source_url: canonical,
                payload: Payload::Video(video),
            })
        }
        ContentKind::SocialPost => {
            let post = resolver.lookup(&canonical).await?;
            Ok(ContentItem {
                kind: ContentKind::SocialPost,
                id: post.id.clone(),
                source_url: canonical,
                payload: Payload::SocialPost(post),
            })
        }
        ContentKind::Unsupported => Err(LookupError::new(format!("unsupported URL: {canonical}"))),
    }
}

/// Resolve every URL concurrently and wait for all of them to settle.
///
/// Results keep the order of `urls`, regardless of completion order.
pub async fn fetch_batch(
    urls: &[String],
    resolver: &dyn LookupResolver,
) -> Vec<Result<ContentItem, LookupError>> {
    let results = join_all(urls.iter().map(|url| resolve_one(url, resolver))).await;

    for (url, result) in urls.iter().zip(&results) {
        if let Err(e) = result {
            warn!(url = %url, error = %e.message, "Failed to resolve URL");
        }
    }

    results
}

/// Resolve the next batch of `state` and merge it.
///
/// When nothing is left, only marks the state exhausted.
pub async fn resolve_batch(
    state: &mut BatchState,
    batch_size: usize,
    resolver: &dyn LookupResolver,
) {
    let slice = state.next_slice(batch_size).to_vec();
    if slice.is_empty() {
        state.mark_exhausted();
        return;
    }

    let results = fetch_batch(&slice, resolver).await;
    state.apply(
        BatchOutcome {
            cursor: state.cursor,
            results,
        },
        batch_size,
    );
}
