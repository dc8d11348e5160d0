//! Integration tests for adoption and progressive loading.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xfun_feed::feed::{Feed, FeedError, ListSource, LoadOutcome, LoadPhase, ScrollMetrics};
use xfun_feed::fetcher::FetchFailureReason;
use xfun_feed::lookup::FxTwitterResolver;
use xfun_feed::models::{ContentKind, Payload};

use common::{
    fetcher_for, offline_fetcher, open_resolver, post_list, post_response, wait_for_calls,
    wait_for_phase, GatedResolver,
};

const VIDEOS: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ\nhttps://youtu.be/9bZkp7q19f0\n";

fn feed_with(resolver: Arc<GatedResolver>, batch_size: usize) -> Feed {
    Feed::new(resolver, offline_fetcher(), batch_size, 800)
}

fn ids(feed_items: &[xfun_feed::models::ContentItem]) -> Vec<&str> {
    feed_items.iter().map(|item| item.id.as_str()).collect()
}

#[tokio::test]
async fn test_adopt_collapses_aliases() {
    let feed = feed_with(open_resolver(), 5);
    let raw = "https://x.com/jack/status/20\nhttps://twitter.com/jack/status/20\n# comment\n";

    let outcome = feed.adopt_list(ListSource::Text(raw.to_string())).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { added: 1 });

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.stats.duplicates_removed, 1);
    assert_eq!(snapshot.stats.attempted, 1);
    assert_eq!(snapshot.state, LoadPhase::Exhausted);
    assert_eq!(snapshot.source.as_deref(), Some("inline"));
}

#[tokio::test]
async fn test_partial_failure_keeps_order() {
    let resolver = GatedResolver::new().failing(&["2"], "NOT_FOUND");
    resolver.open();
    let feed = feed_with(Arc::new(resolver), 5);

    feed.adopt_list(ListSource::Text(post_list(3))).await.unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(ids(&snapshot.items), vec!["1", "3"]);
    assert_eq!(snapshot.stats.failed, 1);
    assert_eq!(snapshot.stats.succeeded, 2);
    assert_eq!(snapshot.stats.attempted, 3);
}

#[tokio::test]
async fn test_partial_failure_through_lookup_service() {
    let server = MockServer::start().await;
    for (handle, id) in [("jack", "20"), ("spacex", "30")] {
        Mock::given(method("GET"))
            .and(path(format!("/{handle}/status/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_response(handle, id)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/ghost/status/25"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "NOT_FOUND",
            "tweet": null
        })))
        .mount(&server)
        .await;

    let resolver = FxTwitterResolver::new(server.uri()).unwrap();
    let feed = Feed::new(Arc::new(resolver), fetcher_for(&server), 5, 800);
    let raw = "https://x.com/jack/status/20\nhttps://x.com/ghost/status/25\nhttps://twitter.com/SpaceX/status/30";

    let outcome = feed.adopt_list(ListSource::Text(raw.to_string())).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { added: 2 });

    let snapshot = feed.snapshot().await;
    assert_eq!(ids(&snapshot.items), vec!["20", "30"]);
    assert_eq!(snapshot.stats.failed, 1);
    assert_eq!(snapshot.stats.succeeded, 2);
    match &snapshot.items[0].payload {
        Payload::SocialPost(post) => assert_eq!(post.author.screen_name, "jack"),
        Payload::Video(_) => panic!("expected a post"),
    }
}

#[tokio::test]
async fn test_videos_resolve_without_lookups() {
    let resolver = Arc::new(GatedResolver::new());
    let feed = feed_with(resolver.clone(), 5);

    let outcome = feed.adopt_list(ListSource::Text(VIDEOS.to_string())).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { added: 2 });
    assert_eq!(resolver.calls(), 0);

    let snapshot = feed.snapshot().await;
    assert!(snapshot.items.iter().all(|item| item.kind == ContentKind::Video));
    assert_eq!(
        snapshot.items[0].id,
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

#[tokio::test]
async fn test_second_trigger_while_loading_is_ignored() {
    let resolver = Arc::new(GatedResolver::new());
    let feed = Arc::new(feed_with(resolver.clone(), 2));

    resolver.release(2);
    let initial = feed.adopt_list(ListSource::Text(post_list(6))).await.unwrap();
    assert_eq!(initial, LoadOutcome::Loaded { added: 2 });
    assert_eq!(feed.snapshot().await.state, LoadPhase::Idle);

    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load_more().await })
    };
    wait_for_phase(&feed, LoadPhase::LoadingMore).await;
    wait_for_calls(&resolver, 4).await;

    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);
    assert_eq!(resolver.calls(), 4);

    resolver.release(2);
    assert_eq!(pending.await.unwrap(), LoadOutcome::Loaded { added: 2 });

    let snapshot = feed.snapshot().await;
    assert_eq!(ids(&snapshot.items), vec!["1", "2", "3", "4"]);
    assert_eq!(snapshot.state, LoadPhase::Idle);
    assert_eq!(snapshot.remaining, 2);
    assert_eq!(resolver.calls(), 4);
}

#[tokio::test]
async fn test_readoption_discards_in_flight_batch() {
    let resolver = Arc::new(GatedResolver::new());
    let feed = Arc::new(feed_with(resolver.clone(), 5));

    let first = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.adopt_list(ListSource::Text(post_list(3))).await })
    };
    wait_for_calls(&resolver, 3).await;

    let second = feed.adopt_list(ListSource::Text(VIDEOS.to_string())).await.unwrap();
    assert_eq!(second, LoadOutcome::Loaded { added: 2 });

    resolver.open();
    assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Stale);

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.items.iter().all(|item| item.kind == ContentKind::Video));
    assert_eq!(snapshot.stats.attempted, 2);
}

#[tokio::test]
async fn test_exhaustion() {
    let feed = feed_with(open_resolver(), 2);

    feed.adopt_list(ListSource::Text(post_list(3))).await.unwrap();
    assert_eq!(feed.snapshot().await.state, LoadPhase::Idle);

    assert_eq!(feed.load_more().await, LoadOutcome::Loaded { added: 1 });
    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Exhausted);
    assert_eq!(snapshot.remaining, 0);

    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);
    assert_eq!(feed.snapshot().await.items.len(), 3);
}

#[tokio::test]
async fn test_scroll_near_end_loads_more() {
    let feed = feed_with(open_resolver(), 2);
    feed.adopt_list(ListSource::Text(post_list(6))).await.unwrap();

    let far = ScrollMetrics {
        scroll_top: 0.0,
        viewport_height: 800.0,
        content_height: 2000.0,
    };
    assert_eq!(feed.on_scroll(far).await, LoadOutcome::Skipped);

    let near = ScrollMetrics {
        scroll_top: 1100.0,
        viewport_height: 800.0,
        content_height: 2000.0,
    };
    assert_eq!(feed.on_scroll(near).await, LoadOutcome::Loaded { added: 2 });
    assert_eq!(feed.snapshot().await.items.len(), 4);
}

#[tokio::test]
async fn test_list_without_urls_keeps_previous_feed() {
    let feed = feed_with(open_resolver(), 2);
    feed.adopt_list(ListSource::Text(post_list(4))).await.unwrap();

    let err = feed
        .adopt_list(ListSource::Text("# nothing here\n\nnot a link\n".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)));

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Idle);
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.error.as_deref(), Some("no valid URLs found"));

    assert_eq!(feed.load_more().await, LoadOutcome::Loaded { added: 2 });
}

#[tokio::test]
async fn test_fetch_failure_then_recovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<!DOCTYPE html><html><body>Just a moment...</body></html>",
        ))
        .mount(&server)
        .await;

    let feed = Feed::new(open_resolver(), fetcher_for(&server), 5, 800);
    feed.adopt_list(ListSource::Text(VIDEOS.to_string())).await.unwrap();

    let err = feed
        .adopt_list(ListSource::Url(format!("{}/list.txt", server.uri())))
        .await
        .unwrap_err();
    match err {
        FeedError::Fetch(e) => assert_eq!(e.reason, FetchFailureReason::Challenge),
        FeedError::Parse(e) => panic!("unexpected parse error: {e}"),
    }

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Failed);
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.error.is_some());
    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);

    let outcome = feed.adopt_list(ListSource::BuiltIn).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { added: 5 });
    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Exhausted);
    assert_eq!(snapshot.source.as_deref(), Some("built-in"));
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_fetched_list_is_adopted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VIDEOS))
        .mount(&server)
        .await;

    let feed = Feed::new(open_resolver(), fetcher_for(&server), 5, 800);
    let url = format!("{}/list.txt", server.uri());
    let outcome = feed.adopt_list(ListSource::Url(url.clone())).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded { added: 2 });
    assert_eq!(feed.snapshot().await.source, Some(url));
}

#[tokio::test]
async fn test_empty_list_during_load_leaves_batch_running() {
    let resolver = Arc::new(GatedResolver::new());
    let feed = Arc::new(feed_with(resolver.clone(), 2));

    resolver.release(2);
    feed.adopt_list(ListSource::Text(post_list(6))).await.unwrap();

    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load_more().await })
    };
    wait_for_phase(&feed, LoadPhase::LoadingMore).await;
    wait_for_calls(&resolver, 4).await;

    let err = feed
        .adopt_list(ListSource::Text("# nothing".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)));
    assert_eq!(feed.snapshot().await.state, LoadPhase::LoadingMore);

    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);
    assert_eq!(resolver.calls(), 4);

    resolver.release(2);
    assert_eq!(pending.await.unwrap(), LoadOutcome::Loaded { added: 2 });

    let snapshot = feed.snapshot().await;
    assert_eq!(ids(&snapshot.items), vec!["1", "2", "3", "4"]);
    assert_eq!(snapshot.state, LoadPhase::Idle);
    assert_eq!(snapshot.stats.attempted, 4);
    assert_eq!(resolver.calls(), 4);
}

#[tokio::test]
async fn test_fetched_list_without_urls_during_load_leaves_batch_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# moved elsewhere\n"))
        .mount(&server)
        .await;

    let resolver = Arc::new(GatedResolver::new());
    let feed = Arc::new(Feed::new(resolver.clone(), fetcher_for(&server), 2, 800));

    resolver.release(2);
    feed.adopt_list(ListSource::Text(post_list(4))).await.unwrap();

    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load_more().await })
    };
    wait_for_calls(&resolver, 4).await;

    let url = format!("{}/empty.txt", server.uri());
    assert!(matches!(
        feed.adopt_list(ListSource::Url(url)).await,
        Err(FeedError::Parse(_))
    ));
    assert_eq!(feed.snapshot().await.state, LoadPhase::LoadingMore);
    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);

    resolver.release(2);
    assert_eq!(pending.await.unwrap(), LoadOutcome::Loaded { added: 2 });
    assert_eq!(feed.snapshot().await.state, LoadPhase::Exhausted);
    assert_eq!(resolver.calls(), 4);
}

#[tokio::test]
async fn test_fetch_failure_during_load_drops_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolver = Arc::new(GatedResolver::new());
    let feed = Arc::new(Feed::new(resolver.clone(), fetcher_for(&server), 2, 800));

    resolver.release(2);
    feed.adopt_list(ListSource::Text(post_list(6))).await.unwrap();

    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load_more().await })
    };
    wait_for_calls(&resolver, 4).await;

    let url = format!("{}/list.txt", server.uri());
    assert!(matches!(
        feed.adopt_list(ListSource::Url(url)).await,
        Err(FeedError::Fetch(_))
    ));
    assert_eq!(feed.snapshot().await.state, LoadPhase::Failed);
    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);

    resolver.release(2);
    assert_eq!(pending.await.unwrap(), LoadOutcome::Stale);

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Failed);
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(resolver.calls(), 4);
}

#[tokio::test]
async fn test_load_before_any_list_is_ignored() {
    let resolver = open_resolver();
    let feed = feed_with(resolver.clone(), 5);

    assert_eq!(feed.load_more().await, LoadOutcome::Skipped);
    let near_end = ScrollMetrics {
        scroll_top: 0.0,
        viewport_height: 800.0,
        content_height: 800.0,
    };
    assert_eq!(feed.on_scroll(near_end).await, LoadOutcome::Skipped);

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.state, LoadPhase::Idle);
    assert!(snapshot.items.is_empty());
    assert_eq!(resolver.calls(), 0);

    let outcome = feed.adopt_list(ListSource::Text(post_list(2))).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { added: 2 });
}
