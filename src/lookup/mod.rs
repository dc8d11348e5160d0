//! Lookup service for social posts.
//!
//! The service takes a post permalink rewritten onto its own host and answers
//! `{code, message, tweet}`. Only `code == 200` carries a post.

pub mod oembed;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::constants::FETCH_USER_AGENT;
use crate::handlers::twitter::lookup_endpoint;
use crate::models::SocialPost;

/// Failure to resolve one URL. Never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup failed: {message}")]
pub struct LookupError {
    pub message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resolves a canonical social post URL into a post.
#[async_trait]
pub trait LookupResolver: Send + Sync {
    async fn lookup(&self, canonical_url: &str) -> Result<SocialPost, LookupError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    code: u16,
    #[serde(default)]
    message: String,
    tweet: Option<SocialPost>,
}

/// HTTP client for FxTwitter-compatible lookup services.
#[derive(Clone)]
pub struct FxTwitterResolver {
    client: Client,
    base_url: String,
}

impl FxTwitterResolver {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(FETCH_USER_AGENT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LookupResolver for FxTwitterResolver {
    async fn lookup(&self, canonical_url: &str) -> Result<SocialPost, LookupError> {
        let endpoint = lookup_endpoint(canonical_url, &self.base_url)
            .ok_or_else(|| LookupError::new(format!("not a post URL: {canonical_url}")))?;

        debug!(url = %canonical_url, endpoint = %endpoint, "Looking up post");

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| LookupError::new(format!("request failed: {e}")))?;

        // The service reports failures in the body, often with a matching HTTP status.
        let status = response.status();
        let body: LookupResponse = response.json().await.map_err(|e| {
            LookupError::new(format!("unreadable response (HTTP {status}): {e}"))
        })?;

        let post = parse_response(body)?;
        debug!(id = %post.id, posted = ?post.created_at_utc(), "Resolved post");
        Ok(post)
    }
}

fn parse_response(body: LookupResponse) -> Result<SocialPost, LookupError> {
    if body.code != 200 {
        return Err(LookupError::new(if body.message.is_empty() {
            format!("code {}", body.code)
        } else {
            body.message
        }));
    }
    body.tweet
        .map(SocialPost::flatten_quotes)
        .ok_or_else(|| LookupError::new("response has no post"))
}
