use std::env;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://quote.alltick.io";
/// The free tier allows one HTTP call per 10 seconds across every endpoint;
/// the default keeps a second of margin on top of that.
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 11_000;
/// Hard cap on codes per batched call on the free tier.
pub const DEFAULT_MAX_CODES_PER_REQUEST: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const TOKEN_ENV: &str = "ALLTICK_TOKEN";
pub const BASE_URL_ENV: &str = "ALLTICK_BASE_URL";
pub const INTERVAL_ENV: &str = "ALLTICK_REQUEST_INTERVAL_MS";

/// Connection settings for the quote service.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub token: String,
    pub base_url: String,
    pub request_interval: Duration,
    pub max_codes_per_request: usize,
    pub timeout: Duration,
}

impl FetchConfig {
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
            max_codes_per_request: DEFAULT_MAX_CODES_PER_REQUEST,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a configuration from the process environment. The token is
    /// required; everything else falls back to the built-in defaults.
    pub fn from_env() -> Result<Self> {
        let token = env::var(TOKEN_ENV).map_err(|_| {
            AppError::message(format!("{} environment variable is required", TOKEN_ENV))
        })?;

        let mut config = Self::new(token);

        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(raw) = env::var(INTERVAL_ENV) {
            let millis = raw.parse::<u64>().map_err(|_| {
                AppError::message(format!("{} must be an integer, got `{}`", INTERVAL_ENV, raw))
            })?;
            config.request_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_free_tier_limits() {
        let config = FetchConfig::new("test-token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_interval, Duration::from_millis(11_000));
        assert_eq!(config.max_codes_per_request, 5);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }
}
