//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use wiremock::MockServer;

use xfun_feed::config::Config;
use xfun_feed::feed::{Feed, LoadPhase};
use xfun_feed::fetcher::ListFetcher;
use xfun_feed::lookup::{LookupError, LookupResolver};
use xfun_feed::models::{Author, SocialPost};

/// Config whose proxies live on the mock server under `/ao` and `/cp`.
pub fn config_for(server: &MockServer) -> Config {
    Config {
        allorigins_base_url: format!("{}/ao", server.uri()),
        corsproxy_base_url: format!("{}/cp", server.uri()),
        lookup_base_url: server.uri(),
        oembed_url: format!("{}/oembed", server.uri()),
        provider_timeout: Duration::from_secs(2),
        ..Config::for_testing()
    }
}

pub fn fetcher_for(server: &MockServer) -> ListFetcher {
    ListFetcher::new(&config_for(server)).expect("Failed to build fetcher")
}

/// Fetcher for feeds that never fetch remote lists.
pub fn offline_fetcher() -> ListFetcher {
    ListFetcher::new(&Config::for_testing()).expect("Failed to build fetcher")
}

/// Lookup service response for a successful post lookup.
pub fn post_response(handle: &str, id: &str) -> Value {
    json!({
        "code": 200,
        "message": "OK",
        "tweet": {
            "url": format!("https://x.com/{handle}/status/{id}"),
            "id": id,
            "text": format!("post {id}"),
            "author": {
                "name": handle,
                "screen_name": handle,
                "avatar_url": format!("https://pbs.twimg.com/profile_images/{handle}.jpg")
            },
            "created_at": "Wed Jul 23 10:00:00 +0000 2025"
        }
    })
}

pub fn post(id: &str) -> SocialPost {
    SocialPost {
        url: format!("https://x.com/u/status/{id}"),
        id: id.to_string(),
        text: format!("post {id}"),
        author: Author {
            name: "U".to_string(),
            screen_name: "u".to_string(),
            avatar_url: String::new(),
        },
        created_at: String::new(),
        media: None,
        quote: None,
    }
}

/// In-memory resolver whose lookups wait for permits.
///
/// Every lookup takes one permit, so with no permits available every call
/// stays pending until [`GatedResolver::release`] is called.
pub struct GatedResolver {
    permits: Semaphore,
    calls: AtomicUsize,
    failing: HashMap<String, String>,
}

impl GatedResolver {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            failing: HashMap::new(),
        }
    }

    /// Make lookups of the given status ids fail with `message`.
    pub fn failing(mut self, ids: &[&str], message: &str) -> Self {
        for id in ids {
            self.failing.insert((*id).to_string(), message.to_string());
        }
        self
    }

    /// Let `n` more lookups complete.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    /// Let every lookup complete from now on.
    pub fn open(&self) {
        self.permits.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupResolver for GatedResolver {
    async fn lookup(&self, canonical_url: &str) -> Result<SocialPost, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.permits
            .acquire()
            .await
            .expect("semaphore closed")
            .forget();

        let id = canonical_url.rsplit('/').next().unwrap_or_default();
        match self.failing.get(id) {
            Some(message) => Err(LookupError::new(message.clone())),
            None => Ok(post(id)),
        }
    }
}

/// Resolver that is open from the start.
pub fn open_resolver() -> Arc<GatedResolver> {
    let resolver = GatedResolver::new();
    resolver.open();
    Arc::new(resolver)
}

/// `n` distinct post URLs with status ids `1..=n`.
pub fn post_list(n: usize) -> String {
    (1..=n)
        .map(|i| format!("https://x.com/u/status/{i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Poll until the feed reports `phase`.
pub async fn wait_for_phase(feed: &Feed, phase: LoadPhase) {
    for _ in 0..400 {
        if feed.snapshot().await.state == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("feed never reached {phase:?}");
}

/// Poll until the resolver has seen at least `n` lookups.
pub async fn wait_for_calls(resolver: &GatedResolver, n: usize) {
    for _ in 0..400 {
        if resolver.calls() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("resolver saw {} calls, expected {n}", resolver.calls());
}
