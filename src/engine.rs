//! Market comparison engine
//!
//! Owns the query parameters, the listing snapshot, the comparison
//! selection and the derived metrics. All mutation goes through the
//! setters below; subscribers are told about every transition.

use crate::{
    calculator,
    config::EngineConfig,
    constants::EVENT_CHANNEL_CAPACITY,
    error::{FetchError, MetricsError, SelectionError},
    metrics::{FetchMetrics, MetricsCollector},
    provider::MarketDataSource,
    providers::CoinGeckoSource,
    query::QueryParameterStore,
    selection::ComparisonSelection,
    snapshot::{ListingSnapshot, SnapshotState},
    types::{
        ComponentHealth, Currency, DerivedMetrics, EngineEvent, EntityQuote, HealthStatus,
        MarketListingRecord, QueryParameters, SelectionSlot, SortDirection,
    },
};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

/// How a fetch generation ended
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response became the visible snapshot
    Installed { generation: u64, record_count: usize },
    /// A newer fetch was issued before this one finished
    Discarded {
        generation: u64,
        current_generation: u64,
    },
    /// Every attempt failed
    Failed {
        generation: u64,
        attempts: u32,
        error: String,
    },
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            FetchOutcome::Installed { generation, .. }
            | FetchOutcome::Discarded { generation, .. }
            | FetchOutcome::Failed { generation, .. } => *generation,
        }
    }
}

/// Handle to a fetch scheduled by a setter
///
/// Dropping the ticket does not cancel the fetch.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the fetch to settle
    pub async fn outcome(self) -> FetchOutcome {
        let generation = self.generation;
        self.handle
            .await
            .unwrap_or_else(|e| FetchOutcome::Failed {
                generation,
                attempts: 0,
                error: format!("fetch task aborted: {}", e),
            })
    }
}

struct EngineState {
    query: QueryParameterStore,
    snapshot: SnapshotState,
    selection: ComparisonSelection,
    derived: Result<DerivedMetrics, MetricsError>,
    generation: u64,
    last_error: Option<String>,
}

struct EngineInner {
    config: EngineConfig,
    source: Arc<dyn MarketDataSource>,
    state: RwLock<EngineState>,
    events: broadcast::Sender<EngineEvent>,
    metrics: MetricsCollector,
}

/// Market comparison engine
///
/// Cheap to clone; clones share state. Setters never block on the
/// network: each one bumps the request generation, moves the snapshot to
/// `Loading` and spawns the fetch on the tokio runtime. A response is only
/// installed if its generation is still the newest when it arrives.
///
/// # Example
/// ```no_run
/// use coin_compare_sdk::{Currency, EngineConfig, MarketEngine};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = MarketEngine::new(EngineConfig::from_env())?;
/// engine.start().outcome().await;
///
/// engine.set_currency(Currency::Eur).outcome().await;
/// engine.select_entity_b("Solana")?;
/// println!("ratio: {:?}", engine.derived_metrics());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MarketEngine {
    inner: Arc<EngineInner>,
}

impl MarketEngine {
    /// Creates an engine backed by CoinGecko
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        let source = Arc::new(CoinGeckoSource::new(&config)?);
        Ok(Self::with_source(config, source))
    }

    /// Creates an engine with a custom data source
    pub fn with_source(config: EngineConfig, source: Arc<dyn MarketDataSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let metrics = MetricsCollector::new(source.source_name());
        let state = EngineState {
            query: QueryParameterStore::new(config.initial_query),
            snapshot: SnapshotState::default(),
            selection: ComparisonSelection::default(),
            derived: Err(MetricsError::IncompleteSelection),
            generation: 0,
            last_error: None,
        };

        Self {
            inner: Arc::new(EngineInner {
                config,
                source,
                state: RwLock::new(state),
                events,
                metrics,
            }),
        }
    }

    /// Issues the first fetch for the configured query
    pub fn start(&self) -> FetchTicket {
        self.issue(|query| query.current())
    }

    /// Fetches the current query again
    pub fn refresh(&self) -> FetchTicket {
        self.issue(|query| query.current())
    }

    /// Changes the currency and returns to page 1
    pub fn set_currency(&self, currency: Currency) -> FetchTicket {
        self.issue(|query| query.set_currency(currency))
    }

    /// Changes the market-cap ordering and returns to page 1
    pub fn set_sort_direction(&self, sort_direction: SortDirection) -> FetchTicket {
        self.issue(|query| query.set_sort_direction(sort_direction))
    }

    pub fn set_page(&self, page: u32) -> FetchTicket {
        self.issue(|query| query.set_page(page))
    }

    pub fn set_page_size(&self, page_size: u32) -> FetchTicket {
        self.issue(|query| query.set_page_size(page_size))
    }

    /// Applies a pagination control change as a single fetch
    pub fn set_pagination(&self, page: u32, page_size: u32) -> FetchTicket {
        self.issue(|query| query.set_pagination(page, page_size))
    }

    /// Assigns the first listing named `name` to slot A
    pub fn select_entity_a(&self, name: &str) -> Result<EntityQuote, SelectionError> {
        self.select_entity(SelectionSlot::A, name)
    }

    /// Assigns the first listing named `name` to slot B
    pub fn select_entity_b(&self, name: &str) -> Result<EntityQuote, SelectionError> {
        self.select_entity(SelectionSlot::B, name)
    }

    /// Assigns a listing to a slot and recomputes the derived metrics.
    ///
    /// A name that is not in the visible snapshot leaves the selection as
    /// it was and returns `LookupMiss`.
    pub fn select_entity(
        &self,
        slot: SelectionSlot,
        name: &str,
    ) -> Result<EntityQuote, SelectionError> {
        let (quote, derived) = {
            let mut guard = self.inner.state.write();
            let state = &mut *guard;

            let snapshot = state
                .snapshot
                .snapshot()
                .cloned()
                .ok_or_else(|| SelectionError::lookup_miss(name));
            let selected = snapshot.and_then(|snapshot| {
                state
                    .selection
                    .select(slot, name, &snapshot)
                    .map(|quote| quote.clone())
            });

            match selected {
                Ok(quote) => {
                    state.derived = calculator::compute(&state.selection);
                    (quote, state.derived.clone())
                }
                Err(e) => {
                    tracing::debug!(?slot, name, "Selection lookup missed, keeping selection");
                    return Err(e);
                }
            }
        };

        tracing::debug!(?slot, name = %quote.name, "Selection changed");
        self.emit(EngineEvent::SelectionChanged {
            id: Uuid::new_v4(),
            slot,
            name: quote.name.clone(),
            timestamp: Utc::now(),
        });
        self.emit_metrics(&derived);

        Ok(quote)
    }

    /// Subscribes to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    pub fn query(&self) -> QueryParameters {
        self.inner.state.read().query.current()
    }

    pub fn state(&self) -> SnapshotState {
        self.inner.state.read().snapshot.clone()
    }

    /// Snapshot the display should show (the previous one while loading)
    pub fn snapshot(&self) -> Option<Arc<ListingSnapshot>> {
        self.inner.state.read().snapshot.snapshot().cloned()
    }

    /// Visible listing rows, empty before the first successful fetch
    pub fn records(&self) -> Vec<MarketListingRecord> {
        self.snapshot()
            .map(|snapshot| snapshot.records().to_vec())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().snapshot.is_loading()
    }

    pub fn selection(&self) -> ComparisonSelection {
        self.inner.state.read().selection.clone()
    }

    pub fn derived_metrics(&self) -> Result<DerivedMetrics, MetricsError> {
        self.inner.state.read().derived.clone()
    }

    /// Newest issued request generation
    pub fn generation(&self) -> u64 {
        self.inner.state.read().generation
    }

    /// Error of the newest fetch, cleared on the next successful install
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.read().last_error.clone()
    }

    pub fn source_name(&self) -> &'static str {
        self.inner.source.source_name()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub async fn fetch_metrics(&self) -> FetchMetrics {
        self.inner.metrics.get_metrics().await
    }

    /// Perform a health check on the engine
    pub async fn health_check(&self) -> ComponentHealth {
        let (state, last_error, generation) = {
            let state = self.inner.state.read();
            (
                state.snapshot.clone(),
                state.last_error.clone(),
                state.generation,
            )
        };
        let fetch_metrics = self.fetch_metrics().await;

        let mut details = std::collections::HashMap::new();
        details.insert(
            "records".to_string(),
            serde_json::json!(state.snapshot().map(|s| s.len()).unwrap_or(0)),
        );
        details.insert("generation".to_string(), serde_json::json!(generation));
        details.insert(
            "source_name".to_string(),
            serde_json::json!(self.source_name()),
        );
        details.insert(
            "success_rate".to_string(),
            serde_json::json!(fetch_metrics.success_rate),
        );

        let (status, message) = match (&state, &last_error) {
            (SnapshotState::Failed { error }, _) => (
                HealthStatus::Unhealthy,
                format!("No listings available: {}", error),
            ),
            (SnapshotState::Loading { previous: None }, _) => (
                HealthStatus::Degraded,
                "Waiting for the first listings".to_string(),
            ),
            (SnapshotState::Loading { .. }, _) => (
                HealthStatus::Degraded,
                "Refreshing listings".to_string(),
            ),
            (SnapshotState::Ready(_), Some(error)) => (
                HealthStatus::Degraded,
                format!("Showing previous listings after a failed fetch: {}", error),
            ),
            (SnapshotState::Ready(_), None) => (
                HealthStatus::Healthy,
                "Listings are up to date".to_string(),
            ),
        };

        ComponentHealth {
            name: "market_engine".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }

    /// Applies a query change and schedules exactly one fetch for it
    fn issue(&self, change: impl FnOnce(&mut QueryParameterStore) -> QueryParameters) -> FetchTicket {
        let (generation, query) = {
            let mut state = self.inner.state.write();
            let query = change(&mut state.query);
            state.generation += 1;
            state.snapshot.begin_loading();
            (state.generation, query)
        };

        tracing::debug!(
            generation,
            currency = %query.currency,
            order = %query.sort_direction.order_param(),
            page = query.page,
            per_page = query.page_size,
            "Issuing listings fetch"
        );
        self.emit(EngineEvent::FetchStarted {
            id: Uuid::new_v4(),
            generation,
            query,
            timestamp: Utc::now(),
        });

        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.run_fetch(generation, query).await });

        FetchTicket { generation, handle }
    }

    /// Fetches with bounded exponential backoff, then installs or fails
    async fn run_fetch(&self, generation: u64, query: QueryParameters) -> FetchOutcome {
        let max_attempts = self.inner.config.max_retry_attempts.max(1);
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.inner.source.fetch_listings(&query).await {
                Ok(records) => {
                    self.inner.metrics.record_fetch(start.elapsed(), true).await;
                    tracing::debug!(
                        generation,
                        count = records.len(),
                        source = self.source_name(),
                        latency_ms = start.elapsed().as_millis() as u64,
                        "Fetched listings"
                    );
                    return self.install(generation, query, records).await;
                }
                Err(e) => {
                    tracing::warn!(
                        generation,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Failed to fetch listings"
                    );

                    if attempt >= max_attempts {
                        self.inner.metrics.record_fetch(start.elapsed(), false).await;
                        return self.fail(generation, attempt, e);
                    }

                    sleep(self.inner.config.backoff_for(attempt)).await;

                    let current_generation = self.generation();
                    if current_generation != generation {
                        tracing::debug!(generation, current_generation, "Abandoning retries for stale fetch");
                        self.inner.metrics.record_discard().await;
                        return FetchOutcome::Discarded {
                            generation,
                            current_generation,
                        };
                    }
                }
            }
        }
    }

    /// Installs a fetched page if its generation is still current
    async fn install(
        &self,
        generation: u64,
        query: QueryParameters,
        records: Vec<MarketListingRecord>,
    ) -> FetchOutcome {
        let installed = {
            let mut guard = self.inner.state.write();
            let state = &mut *guard;

            if state.generation != generation {
                Err(state.generation)
            } else {
                let snapshot = Arc::new(ListingSnapshot::new(query, records, generation));
                state.snapshot = SnapshotState::Ready(snapshot.clone());
                state.selection.reseed(&snapshot);
                state.derived = calculator::compute(&state.selection);
                state.last_error = None;
                Ok((snapshot.len(), state.derived.clone()))
            }
        };

        match installed {
            Ok((record_count, derived)) => {
                tracing::info!(generation, record_count, currency = %query.currency, "Installed listing snapshot");
                self.emit(EngineEvent::SnapshotInstalled {
                    id: Uuid::new_v4(),
                    generation,
                    query,
                    record_count,
                    timestamp: Utc::now(),
                });
                self.emit(EngineEvent::SelectionReseeded {
                    id: Uuid::new_v4(),
                    generation,
                    timestamp: Utc::now(),
                });
                self.emit_metrics(&derived);

                FetchOutcome::Installed {
                    generation,
                    record_count,
                }
            }
            Err(current_generation) => {
                tracing::warn!(generation, current_generation, "Discarding stale listings response");
                self.inner.metrics.record_discard().await;
                self.emit(EngineEvent::StaleResponseDiscarded {
                    id: Uuid::new_v4(),
                    generation,
                    current_generation,
                    timestamp: Utc::now(),
                });

                FetchOutcome::Discarded {
                    generation,
                    current_generation,
                }
            }
        }
    }

    /// Settles a generation whose every attempt failed
    fn fail(&self, generation: u64, attempts: u32, error: FetchError) -> FetchOutcome {
        let error = error.to_string();
        let current_generation = {
            let mut state = self.inner.state.write();
            if state.generation == generation {
                state.snapshot.settle_failure(error.clone());
                state.last_error = Some(error.clone());
            }
            state.generation
        };

        if current_generation != generation {
            return FetchOutcome::Discarded {
                generation,
                current_generation,
            };
        }

        self.emit(EngineEvent::FetchFailed {
            id: Uuid::new_v4(),
            generation,
            attempts,
            error_message: error.clone(),
            timestamp: Utc::now(),
        });

        FetchOutcome::Failed {
            generation,
            attempts,
            error,
        }
    }

    fn emit_metrics(&self, derived: &Result<DerivedMetrics, MetricsError>) {
        self.emit(EngineEvent::MetricsUpdated {
            id: Uuid::new_v4(),
            cap_ratio: derived.as_ref().ok().map(|m| m.cap_ratio),
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: EngineEvent) {
        if self.inner.events.send(event).is_err() {
            // No subscribers
            tracing::trace!("No engine event receivers");
        }
    }
}
