use std::time::Duration;

use thiserror::Error;

use crate::constants::DEFAULT_PROXY_REQUIRED_HOSTS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // List source
    pub list_url: Option<String>,
    pub proxy_required_hosts: Vec<String>,
    pub allorigins_base_url: String,
    pub corsproxy_base_url: String,
    pub provider_timeout: Duration,

    // Pagination
    pub batch_size: usize,
    pub scroll_threshold_px: u32,

    // Lookup services
    pub lookup_base_url: String,
    pub oembed_url: String,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // List source
            list_url: optional_env("LIST_URL"),
            proxy_required_hosts: parse_host_list(&env_or_default(
                "PROXY_REQUIRED_HOSTS",
                &DEFAULT_PROXY_REQUIRED_HOSTS.join(","),
            )),
            allorigins_base_url: env_or_default("ALLORIGINS_BASE_URL", "https://api.allorigins.win"),
            corsproxy_base_url: env_or_default("CORSPROXY_BASE_URL", "https://corsproxy.io"),
            provider_timeout: Duration::from_secs(parse_env_u64("PROVIDER_TIMEOUT_SECS", 8)?),

            // Pagination
            batch_size: parse_env_usize("BATCH_SIZE", 5)?,
            scroll_threshold_px: parse_env_u32("SCROLL_THRESHOLD_PX", 800)?,

            // Lookup services
            lookup_base_url: env_or_default("LOOKUP_BASE_URL", "https://api.fxtwitter.com"),
            oembed_url: env_or_default("OEMBED_URL", "https://www.youtube.com/oembed"),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Defaults without reading the environment.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            list_url: None,
            proxy_required_hosts: parse_host_list(&DEFAULT_PROXY_REQUIRED_HOSTS.join(",")),
            allorigins_base_url: "https://api.allorigins.win".to_string(),
            corsproxy_base_url: "https://corsproxy.io".to_string(),
            provider_timeout: Duration::from_secs(2),
            batch_size: 5,
            scroll_threshold_px: 800,
            lookup_base_url: "https://api.fxtwitter.com".to_string(),
            oembed_url: "https://www.youtube.com/oembed".to_string(),
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BATCH_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.provider_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "PROVIDER_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("LOOKUP_BASE_URL", &self.lookup_base_url),
            ("OEMBED_URL", &self.oembed_url),
            ("ALLORIGINS_BASE_URL", &self.allorigins_base_url),
            ("CORSPROXY_BASE_URL", &self.corsproxy_base_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("not a valid URL: '{value}'"),
                });
            }
        }
        if let Some(list_url) = &self.list_url {
            if url::Url::parse(list_url).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: "LIST_URL".to_string(),
                    message: format!("not a valid URL: '{list_url}'"),
                });
            }
        }
        Ok(())
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

/// Comma-separated host list, lowercased, without `www.` prefixes.
fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .filter(|h| !h.is_empty())
        .collect()
}
