//! Constants for the market comparison engine
//!
//! These are the compile-time defaults. `EngineConfig::from_env` can
//! override a subset of them at startup.

use crate::types::{Currency, SortDirection};

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for market listings
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// HTTP request timeout when fetching listings (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of attempts per fetch (1 disables retrying)
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff delay for retries (in milliseconds)
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay for retries (in milliseconds)
pub const MAX_BACKOFF_MS: u64 = 30000;

/// Currency used until the user picks another one
pub const DEFAULT_CURRENCY: Currency = Currency::Usd;

/// Market-cap ordering used until the user picks another one
pub const DEFAULT_SORT_DIRECTION: SortDirection = SortDirection::Desc;

/// Rows per page until the pagination control says otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Row count advertised to the pagination control
pub const PAGINATION_TOTAL: u32 = 10_000;

/// Capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "coin-compare-sdk/0.1.0";
