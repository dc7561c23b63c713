//! # Coin Compare SDK
//!
//! Keeps a live page of cryptocurrency market listings (CoinGecko
//! `/coins/markets`) and compares two of them by market cap.
//!
//! ## Architecture
//!
//! ```text
//! setter (currency / sort / page)
//!     ↓  generation += 1, state = Loading
//! MarketDataSource (CoinGecko)
//!     ↓  newest generation only
//! ListingSnapshot (Ready)
//!     ↓  reseed slots A/B with rows 0 and 1
//! ComparisonSelection → calculator → DerivedMetrics
//! ```
//!
//! Picking an entity for slot A or B only touches the selection and the
//! metrics; the snapshot stays as it is.
//!
//! ## Usage
//!
//! ```no_run
//! use coin_compare_sdk::{presentation, EngineConfig, MarketEngine, SortDirection};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MarketEngine::new(EngineConfig::from_env())?;
//! engine.start().outcome().await;
//!
//! engine.set_sort_direction(SortDirection::Asc).outcome().await;
//! engine.select_entity_a("Bitcoin")?;
//!
//! let metrics = engine.derived_metrics();
//! println!(
//!     "{} {}",
//!     presentation::comparison_headline(&engine.selection(), &metrics),
//!     presentation::format_ratio(&metrics)
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - `FetchError`: after the configured retries the previous snapshot stays
//!   visible, or the state becomes `Failed` when there is none.
//! - `SelectionError::LookupMiss`: the selection is left unchanged.
//! - `MetricsError::DegenerateInput`: a zero cap or price in a denominator;
//!   presentation helpers render it as `undefined`.

pub mod calculator;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod presentation;
pub mod provider;
pub mod providers;
pub mod query;
pub mod selection;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{FetchOutcome, FetchTicket, MarketEngine};
pub use error::{FetchError, MetricsError, SelectionError};
pub use metrics::FetchMetrics;
pub use provider::MarketDataSource;
pub use selection::ComparisonSelection;
pub use snapshot::{ListingSnapshot, SnapshotState};
pub use types::{
    ComponentHealth, Currency, DerivedMetrics, EngineEvent, EntityQuote, HealthStatus,
    MarketListingRecord, QueryParameters, SelectionSlot, SortDirection,
};
