//! Client configuration.
//!
//! `ClientConfig` is built once and moved into the client; nothing reads
//! process-wide state after construction.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Timeout applied by the default transport when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the categories service, stored without a trailing `/`.
    pub base_url: String,
    /// Sent as `x-api-key` on every call.
    pub api_key: String,
    /// Default `authorization` value for calls that do not pass their own.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `CATEGORIES_BASE_URL`, `CATEGORIES_API_KEY`, `CATEGORIES_TOKEN`
    /// and `CATEGORIES_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url =
            lookup("CATEGORIES_BASE_URL").ok_or(ConfigError::Missing("CATEGORIES_BASE_URL"))?;
        if base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "CATEGORIES_BASE_URL",
                value: base_url,
            });
        }
        let api_key =
            lookup("CATEGORIES_API_KEY").ok_or(ConfigError::Missing("CATEGORIES_API_KEY"))?;

        let mut config = Self::new(&base_url, &api_key);
        if let Some(token) = lookup("CATEGORIES_TOKEN").filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        if let Some(raw) = lookup("CATEGORIES_TIMEOUT_SECS") {
            // Must be positive.
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "CATEGORIES_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
