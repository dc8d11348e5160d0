//! Resilient retrieval of externally hosted URL lists.
//!
//! A list URL is read through an ordered chain of [`AccessProvider`]s. Hosts known
//! to refuse direct reads skip straight to the proxies. Every body, whichever path
//! produced it, is checked with [`inspect_body`] so HTML error pages and bot
//! interstitials served with a 200 are never mistaken for list content.

pub mod providers;
pub mod validate;

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use providers::{
    AccessProvider, AllOriginsProvider, CorsProxyProvider, DirectProvider, ProviderError,
};
pub use validate::{inspect_body, BodyVerdict};

use crate::config::Config;
use crate::constants::FETCH_USER_AGENT;
use crate::handlers::host_of;

/// Why a list could not be fetched, ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailureReason {
    /// Every provider refused (non-success status or unusable envelope).
    ExhaustedProviders,
    /// At least one provider could not be reached or timed out.
    Transport,
    /// A provider returned an HTML document instead of text.
    Html,
    /// A provider returned an anti-bot challenge page.
    Challenge,
}

impl fmt::Display for FetchFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExhaustedProviders => "all providers failed",
            Self::Transport => "network error",
            Self::Html => "received an HTML page instead of a list",
            Self::Challenge => "blocked by a bot-check page",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
#[error("failed to fetch list: {reason} ({detail})")]
pub struct ListFetchError {
    pub reason: FetchFailureReason,
    /// Per-provider outcome, in attempt order.
    pub detail: String,
}

/// Fetches list text through direct access and fallback proxies.
pub struct ListFetcher {
    client: Client,
    direct: Arc<dyn AccessProvider>,
    fallbacks: Vec<Arc<dyn AccessProvider>>,
    proxy_required_hosts: Vec<String>,
}

impl ListFetcher {
    /// Build the standard chain (direct, allorigins, corsproxy) from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.provider_timeout)
            .user_agent(FETCH_USER_AGENT)
            .build()?;

        Ok(Self::with_providers(
            client,
            Arc::new(DirectProvider),
            vec![
                Arc::new(AllOriginsProvider::new(&config.allorigins_base_url)),
                Arc::new(CorsProxyProvider::new(&config.corsproxy_base_url)),
            ],
            config.proxy_required_hosts.clone(),
        ))
    }

    #[must_use]
    pub fn with_providers(
        client: Client,
        direct: Arc<dyn AccessProvider>,
        fallbacks: Vec<Arc<dyn AccessProvider>>,
        proxy_required_hosts: Vec<String>,
    ) -> Self {
        Self {
            client,
            direct,
            fallbacks,
            proxy_required_hosts,
        }
    }

    /// Whether `list_url` is on a host that must be reached through a proxy.
    #[must_use]
    pub fn requires_proxy(&self, list_url: &str) -> bool {
        host_of(list_url).is_some_and(|host| {
            self.proxy_required_hosts
                .iter()
                .any(|h| host == *h || host.ends_with(&format!(".{h}")))
        })
    }

    /// Providers to try for `list_url`, in order.
    #[must_use]
    pub fn chain_for(&self, list_url: &str) -> Vec<&dyn AccessProvider> {
        let fallbacks = self.fallbacks.iter().map(AsRef::as_ref);
        if self.requires_proxy(list_url) {
            fallbacks.collect()
        } else {
            std::iter::once(self.direct.as_ref()).chain(fallbacks).collect()
        }
    }

    /// Fetch the raw text of a list.
    ///
    /// The first provider that answers with a non-HTML body wins.
    ///
    /// # Errors
    ///
    /// Returns [`ListFetchError`] with the most specific reason seen when every
    /// provider fails.
    pub async fn fetch_list(&self, list_url: &str) -> Result<String, ListFetchError> {
        let list_url = list_url.trim();
        if host_of(list_url).is_none() {
            return Err(ListFetchError {
                reason: FetchFailureReason::Transport,
                detail: format!("not a fetchable URL: '{list_url}'"),
            });
        }

        let mut reason = FetchFailureReason::ExhaustedProviders;
        let mut attempts = Vec::new();

        for provider in self.chain_for(list_url) {
            let name = provider.name();
            debug!(provider = name, url = %list_url, "Fetching list");

            let (failure, message) = match provider.issue(&self.client, list_url).await {
                Ok(body) => match inspect_body(&body) {
                    BodyVerdict::PlainText => {
                        info!(provider = name, url = %list_url, bytes = body.len(), "Fetched list");
                        return Ok(body);
                    }
                    BodyVerdict::ChallengePage => {
                        (FetchFailureReason::Challenge, "bot-check page".to_string())
                    }
                    BodyVerdict::HtmlPage => (FetchFailureReason::Html, "HTML page".to_string()),
                },
                Err(e @ ProviderError::Transport(_)) => (FetchFailureReason::Transport, e.to_string()),
                Err(e) => (FetchFailureReason::ExhaustedProviders, e.to_string()),
            };

            warn!(provider = name, url = %list_url, error = %message, "List provider failed");
            reason = reason.max(failure);
            attempts.push(format!("{name}: {message}"));
        }

        Err(ListFetchError {
            reason,
            detail: if attempts.is_empty() {
                "no providers configured".to_string()
            } else {
                attempts.join("; ")
            },
        })
    }
}
