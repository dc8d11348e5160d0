use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::feed::{FeedError, FeedSnapshot, ListSource, LoadOutcome, ScrollMetrics};
use crate::handlers::youtube::is_valid_video_id;
use crate::lookup::oembed::fetch_video_metadata;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/feed", get(api_feed))
        .route("/api/feed/list", post(api_adopt_list))
        .route("/api/feed/more", post(api_load_more))
        .route("/api/feed/scroll", post(api_scroll))
        .route("/api/video/:id/meta", get(api_video_meta))
}

async fn health() -> &'static str {
    "OK"
}

// ========== Feed Routes ==========

async fn api_feed(State(state): State<AppState>) -> Json<FeedSnapshot> {
    Json(state.feed.snapshot().await)
}

/// Body of a list adoption request. With neither field set the built-in list is used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdoptListRequest {
    pub text: Option<String>,
    pub url: Option<String>,
}

impl AdoptListRequest {
    fn into_source(self) -> Result<ListSource, &'static str> {
        match (self.text, self.url) {
            (Some(_), Some(_)) => Err("provide either text or url, not both"),
            (Some(text), None) => Ok(ListSource::Text(text)),
            (None, Some(url)) => Ok(ListSource::Url(url)),
            (None, None) => Ok(ListSource::BuiltIn),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadResponse {
    #[serde(flatten)]
    outcome: LoadOutcome,
    snapshot: FeedSnapshot,
}

async fn api_adopt_list(
    State(state): State<AppState>,
    Json(request): Json<AdoptListRequest>,
) -> Response {
    let source = match request.into_source() {
        Ok(source) => source,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    match state.feed.adopt_list(source).await {
        Ok(outcome) => Json(LoadResponse {
            outcome,
            snapshot: state.feed.snapshot().await,
        })
        .into_response(),
        Err(FeedError::Parse(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(FeedError::Fetch(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": e.to_string(),
                "reason": e.reason,
            })),
        )
            .into_response(),
    }
}

async fn api_load_more(State(state): State<AppState>) -> Json<LoadResponse> {
    let outcome = state.feed.load_more().await;
    Json(LoadResponse {
        outcome,
        snapshot: state.feed.snapshot().await,
    })
}

async fn api_scroll(
    State(state): State<AppState>,
    Json(metrics): Json<ScrollMetrics>,
) -> Json<LoadResponse> {
    let outcome = state.feed.on_scroll(metrics).await;
    Json(LoadResponse {
        outcome,
        snapshot: state.feed.snapshot().await,
    })
}

// ========== Video Routes ==========

async fn api_video_meta(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if !is_valid_video_id(&id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid video id" })),
        )
            .into_response();
    }

    match fetch_video_metadata(&state.http, &state.config.oembed_url, &id).await {
        Ok(metadata) => Json(metadata).into_response(),
        Err(e) => {
            tracing::warn!(video_id = %id, "Failed to fetch video metadata: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}
