//! Runtime settings for the engine and the CoinGecko adapter

use crate::{
    constants::{
        COINGECKO_API_URL, DEFAULT_CURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_SORT_DIRECTION,
        INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRY_ATTEMPTS, REQUEST_TIMEOUT_SECS,
    },
    types::{Currency, QueryParameters, SortDirection},
};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_API_URL: &str = "COIN_COMPARE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "COIN_COMPARE_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "COIN_COMPARE_MAX_RETRIES";
pub const ENV_CURRENCY: &str = "COIN_COMPARE_CURRENCY";
pub const ENV_SORT: &str = "COIN_COMPARE_SORT";
pub const ENV_PAGE_SIZE: &str = "COIN_COMPARE_PAGE_SIZE";

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Base URL of the market-data API
    pub api_base_url: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Attempts per fetch, including the first
    pub max_retry_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Upper bound for the doubling backoff
    pub max_backoff: Duration,
    /// Query used for the first fetch
    pub initial_query: QueryParameters,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: COINGECKO_API_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_retry_attempts: MAX_RETRY_ATTEMPTS,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
            initial_query: QueryParameters::new(
                DEFAULT_CURRENCY,
                DEFAULT_SORT_DIRECTION,
                1,
                DEFAULT_PAGE_SIZE,
            ),
        }
    }
}

impl EngineConfig {
    /// Builds the configuration from defaults overridden by `COIN_COMPARE_*`
    /// environment variables. Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES) {
            config.max_retry_attempts = attempts.max(1);
        }
        if let Some(currency) = parse_var::<Currency>(&lookup, ENV_CURRENCY) {
            config.initial_query.currency = currency;
        }
        if let Some(sort) = parse_var::<SortDirection>(&lookup, ENV_SORT) {
            config.initial_query.sort_direction = sort;
        }
        if let Some(page_size) = parse_var::<u32>(&lookup, ENV_PAGE_SIZE) {
            config.initial_query.page_size = page_size.max(1);
        }

        config
    }

    /// Backoff delay after the given failed attempt (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid config value");
            None
        }
    }
}
