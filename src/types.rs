//! Types for the market comparison engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Quote currency for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// Get the `vs_currency` code used by the API
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }

    /// Get all supported currencies
    pub fn all() -> &'static [Currency] {
        &[Currency::Usd, Currency::Eur]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            other => Err(format!("unsupported currency: {}", other)),
        }
    }
}

/// Direction of the market-cap ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest market cap first
    Asc,
    /// Largest market cap first
    Desc,
}

impl SortDirection {
    /// Get the direction suffix (`asc` / `desc`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Get the full `order` query value, e.g. `market_cap_desc`
    pub fn order_param(&self) -> String {
        format!("market_cap_{}", self.as_str())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unsupported sort direction: {}", other)),
        }
    }
}

/// Parameters that select which listings page is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParameters {
    /// Quote currency
    pub currency: Currency,
    /// Market-cap ordering
    pub sort_direction: SortDirection,
    /// 1-based page index
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
}

impl QueryParameters {
    /// Create query parameters, clamping page and page size to at least 1
    pub fn new(currency: Currency, sort_direction: SortDirection, page: u32, page_size: u32) -> Self {
        Self {
            currency,
            sort_direction,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// One tradable entity as listed at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListingRecord {
    /// Stable identifier, unique within a snapshot
    pub id: String,
    /// Display name, also the selection key
    pub name: String,
    /// Logo URL
    pub image_url: Option<String>,
    /// Price in the active currency
    pub current_price: f64,
    /// Market cap in the active currency
    pub market_cap: f64,
    /// Circulating supply
    pub circulating_supply: f64,
}

/// Value copy of a record held by a comparison slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQuote {
    pub name: String,
    pub current_price: f64,
    pub market_cap: f64,
}

impl EntityQuote {
    pub fn new(name: impl Into<String>, current_price: f64, market_cap: f64) -> Self {
        Self {
            name: name.into(),
            current_price,
            market_cap,
        }
    }
}

impl From<&MarketListingRecord> for EntityQuote {
    fn from(record: &MarketListingRecord) -> Self {
        Self {
            name: record.name.clone(),
            current_price: record.current_price,
            market_cap: record.market_cap,
        }
    }
}

/// One of the two comparison positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionSlot {
    A,
    B,
}

/// Valuation figures derived from a comparison selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// `capA / capB` when A is bigger, `-(capB / capA)` when smaller, 0 when equal
    pub cap_ratio: f64,
    /// Price A would have with B's market cap
    pub entity_a_value_at_entity_b_cap: f64,
    /// Market cap A would have at B's price
    pub entity_a_cap_at_entity_b_price: f64,
}

/// Engine events delivered to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    /// A fetch was issued for a new generation
    FetchStarted {
        id: Uuid,
        generation: u64,
        query: QueryParameters,
        timestamp: DateTime<Utc>,
    },

    /// A fetch completed and its snapshot is now visible
    SnapshotInstalled {
        id: Uuid,
        generation: u64,
        query: QueryParameters,
        record_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived after a newer fetch was issued and was dropped
    StaleResponseDiscarded {
        id: Uuid,
        generation: u64,
        current_generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// All attempts for a generation failed
    FetchFailed {
        id: Uuid,
        generation: u64,
        attempts: u32,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// Both slots were overwritten from a fresh snapshot
    SelectionReseeded {
        id: Uuid,
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// The user assigned an entity to one slot
    SelectionChanged {
        id: Uuid,
        slot: SelectionSlot,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Derived metrics were recomputed (`cap_ratio` is None when undefined)
    MetricsUpdated {
        id: Uuid,
        cap_ratio: Option<f64>,
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            EngineEvent::FetchStarted { id, .. } => *id,
            EngineEvent::SnapshotInstalled { id, .. } => *id,
            EngineEvent::StaleResponseDiscarded { id, .. } => *id,
            EngineEvent::FetchFailed { id, .. } => *id,
            EngineEvent::SelectionReseeded { id, .. } => *id,
            EngineEvent::SelectionChanged { id, .. } => *id,
            EngineEvent::MetricsUpdated { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::FetchStarted { .. } => "FETCH_STARTED",
            EngineEvent::SnapshotInstalled { .. } => "SNAPSHOT_INSTALLED",
            EngineEvent::StaleResponseDiscarded { .. } => "STALE_RESPONSE_DISCARDED",
            EngineEvent::FetchFailed { .. } => "FETCH_FAILED",
            EngineEvent::SelectionReseeded { .. } => "SELECTION_RESEEDED",
            EngineEvent::SelectionChanged { .. } => "SELECTION_CHANGED",
            EngineEvent::MetricsUpdated { .. } => "METRICS_UPDATED",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::FetchStarted {
                generation, query, ..
            } => write!(
                f,
                "Fetch #{} started: {} {} page {}",
                generation,
                query.currency,
                query.sort_direction.order_param(),
                query.page
            ),
            EngineEvent::SnapshotInstalled {
                generation,
                record_count,
                ..
            } => write!(f, "Snapshot #{} installed ({} records)", generation, record_count),
            EngineEvent::StaleResponseDiscarded {
                generation,
                current_generation,
                ..
            } => write!(
                f,
                "Discarded response #{} (current #{})",
                generation, current_generation
            ),
            EngineEvent::FetchFailed {
                generation,
                attempts,
                error_message,
                ..
            } => write!(
                f,
                "Fetch #{} failed after {} attempts: {}",
                generation, attempts, error_message
            ),
            EngineEvent::SelectionReseeded { generation, .. } => {
                write!(f, "Selection reseeded from snapshot #{}", generation)
            }
            EngineEvent::SelectionChanged { slot, name, .. } => {
                write!(f, "Slot {:?} set to {}", slot, name)
            }
            EngineEvent::MetricsUpdated { cap_ratio, .. } => match cap_ratio {
                Some(ratio) => write!(f, "Metrics updated: ratio {:.2}", ratio),
                None => write!(f, "Metrics updated: undefined"),
            },
        }
    }
}

/// Overall system health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// A fresh snapshot is visible
    Healthy,
    /// Loading, or the last fetch failed while an older snapshot is visible
    Degraded,
    /// No snapshot could be obtained
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_param() {
        assert_eq!(SortDirection::Asc.order_param(), "market_cap_asc");
        assert_eq!(SortDirection::Desc.order_param(), "market_cap_desc");
    }

    #[test]
    fn test_parse_currency_and_sort() {
        assert_eq!(" EUR ".parse::<Currency>(), Ok(Currency::Eur));
        assert!("gbp".parse::<Currency>().is_err());
        for currency in Currency::all() {
            assert_eq!(currency.code().parse::<Currency>(), Ok(*currency));
        }
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
    }

    #[test]
    fn test_query_parameters_clamp() {
        let query = QueryParameters::new(Currency::Usd, SortDirection::Desc, 0, 0);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 1);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = EngineEvent::SelectionChanged {
            id: Uuid::new_v4(),
            slot: SelectionSlot::B,
            name: "Ethereum".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SELECTION_CHANGED");
        assert_eq!(event.event_type(), "SELECTION_CHANGED");
    }
}
