//! Pagination controller.
//!
//! A [`Feed`] owns the current [`BatchState`] and decides when the next batch is
//! resolved: once when a list is adopted, then on explicit or scroll-driven
//! triggers. Triggers while a batch is in flight, after the list is exhausted, or
//! after a failed adoption are no-ops, so batches never overlap and always merge
//! in index order.
//!
//! Adopting a list, or failing to fetch one, bumps a generation counter. A batch
//! that settles under an older generation is dropped instead of merged. Nothing
//! changes before a new list has been obtained and parsed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::batch::{fetch_batch, BatchOutcome, BatchState, BatchStats};
use crate::config::Config;
use crate::fetcher::{ListFetchError, ListFetcher};
use crate::list::{default_list_text, prepare, ParseError};
use crate::lookup::{FxTwitterResolver, LookupResolver};
use crate::models::ContentItem;

/// Where a feed's lists come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    /// Raw list text supplied directly.
    Text(String),
    /// A list hosted elsewhere, fetched through the provider chain.
    Url(String),
    /// The built-in demo list.
    BuiltIn,
}

impl ListSource {
    fn label(&self) -> String {
        match self {
            Self::Text(_) => "inline".to_string(),
            Self::Url(url) => url.clone(),
            Self::BuiltIn => "built-in".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    LoadingInitial,
    LoadingMore,
    Exhausted,
    Failed,
}

/// What a load request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A batch was resolved and merged.
    Loaded { added: usize },
    /// The trigger was ignored: no list yet, a batch in flight, nothing left, or not near the end.
    Skipped,
    /// A newer list was adopted while this batch was in flight; its results were dropped.
    Stale,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fetch(#[from] ListFetchError),
}

/// Scroll position reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Unseen distance below the viewport.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        (self.content_height - self.scroll_top - self.viewport_height).max(0.0)
    }
}

/// Point-in-time view of a feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub items: Vec<ContentItem>,
    pub stats: BatchStats,
    pub state: LoadPhase,
    pub source: Option<String>,
    pub error: Option<String>,
    /// URLs not yet attempted.
    pub remaining: usize,
}

struct FeedInner {
    batch: BatchState,
    phase: LoadPhase,
    generation: u64,
    source: Option<String>,
    error: Option<String>,
}

impl FeedInner {
    /// Phase to rest in once nothing is loading.
    fn settled_phase(&self) -> LoadPhase {
        if self.batch.is_exhausted() {
            LoadPhase::Exhausted
        } else {
            LoadPhase::Idle
        }
    }
}

pub struct Feed {
    inner: Mutex<FeedInner>,
    resolver: Arc<dyn LookupResolver>,
    fetcher: ListFetcher,
    batch_size: usize,
    scroll_threshold_px: f64,
}

impl Feed {
    #[must_use]
    pub fn new(
        resolver: Arc<dyn LookupResolver>,
        fetcher: ListFetcher,
        batch_size: usize,
        scroll_threshold_px: u32,
    ) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                batch: BatchState::default(),
                phase: LoadPhase::Idle,
                generation: 0,
                source: None,
                error: None,
            }),
            resolver,
            fetcher,
            batch_size: batch_size.max(1),
            scroll_threshold_px: f64::from(scroll_threshold_px),
        }
    }

    /// Build a feed backed by the real lookup service and provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let resolver = FxTwitterResolver::new(&config.lookup_base_url)?;
        let fetcher = ListFetcher::new(config)?;
        Ok(Self::new(
            Arc::new(resolver),
            fetcher,
            config.batch_size,
            config.scroll_threshold_px,
        ))
    }

    /// Replace the current list and load its first batch.
    ///
    /// The list is obtained and parsed before anything changes, so batches of the
    /// current list keep running meanwhile. A list with no usable URLs only
    /// records the error. A fetch failure moves the feed to `Failed` and drops
    /// any batch still in flight; loaded items stay visible.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the list cannot be fetched or holds no valid URLs.
    pub async fn adopt_list(&self, source: ListSource) -> Result<LoadOutcome, FeedError> {
        let label = source.label();
        let started = self.inner.lock().await.generation;
        info!(source = %label, "Adopting list");

        let raw = match source {
            ListSource::Text(text) => text,
            ListSource::BuiltIn => default_list_text(),
            ListSource::Url(url) => match self.fetcher.fetch_list(&url).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(source = %label, reason = %e.reason, "List fetch failed");
                    self.fail_adoption(started, e.to_string()).await;
                    return Err(e.into());
                }
            },
        };

        let prepared = match prepare(&raw) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(source = %label, "List has no valid URLs");
                self.inner.lock().await.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let (generation, slice, cursor) = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            info!(
                source = %label,
                generation = inner.generation,
                urls = prepared.urls.len(),
                duplicates = prepared.removed,
                "List adopted"
            );
            inner.batch = BatchState::new(prepared);
            inner.phase = LoadPhase::LoadingInitial;
            inner.source = Some(label);
            inner.error = None;
            (
                inner.generation,
                inner.batch.next_slice(self.batch_size).to_vec(),
                inner.batch.cursor(),
            )
        };

        Ok(self.run_batch(generation, slice, cursor).await)
    }

    /// Resolve the next batch if the feed is idle.
    pub async fn load_more(&self) -> LoadOutcome {
        let (generation, slice, cursor) = {
            let mut inner = self.inner.lock().await;
            if inner.phase != LoadPhase::Idle || inner.source.is_none() {
                debug!(phase = ?inner.phase, "Ignoring load trigger");
                return LoadOutcome::Skipped;
            }
            inner.phase = LoadPhase::LoadingMore;
            (
                inner.generation,
                inner.batch.next_slice(self.batch_size).to_vec(),
                inner.batch.cursor(),
            )
        };

        self.run_batch(generation, slice, cursor).await
    }

    /// Load more when the reported scroll position is close to the end.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> LoadOutcome {
        if metrics.remaining() >= self.scroll_threshold_px {
            return LoadOutcome::Skipped;
        }
        self.load_more().await
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let inner = self.inner.lock().await;
        let stats = inner.batch.stats();
        FeedSnapshot {
            items: inner.batch.items().to_vec(),
            stats,
            state: inner.phase,
            source: inner.source.clone(),
            error: inner.error.clone(),
            remaining: inner.batch.url_list().len().saturating_sub(stats.attempted),
        }
    }

    async fn run_batch(&self, generation: u64, slice: Vec<String>, cursor: usize) -> LoadOutcome {
        let results = if slice.is_empty() {
            Vec::new()
        } else {
            fetch_batch(&slice, self.resolver.as_ref()).await
        };

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!(generation, current = inner.generation, "Discarding stale batch");
            return LoadOutcome::Stale;
        }

        let before = inner.batch.items().len();
        if slice.is_empty() {
            inner.batch.mark_exhausted();
        } else {
            inner.batch.apply(BatchOutcome { cursor, results }, self.batch_size);
        }
        let added = inner.batch.items().len() - before;
        let settled = inner.settled_phase();
        inner.phase = settled;

        LoadOutcome::Loaded { added }
    }

    /// Enter `Failed` unless another list was adopted since `started`.
    async fn fail_adoption(&self, started: u64, message: String) {
        let mut inner = self.inner.lock().await;
        if inner.generation != started {
            debug!(started, current = inner.generation, "Ignoring failure of superseded adoption");
            return;
        }
        // Invalidate any batch of the previous list that is still in flight.
        inner.generation += 1;
        inner.phase = LoadPhase::Failed;
        inner.error = Some(message);
    }
}
