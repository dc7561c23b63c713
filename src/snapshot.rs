//! Listing snapshot and its loading state

use crate::types::{MarketListingRecord, QueryParameters};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Records of one successful fetch plus the parameters that produced them
///
/// Never patched in place; a new fetch replaces the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSnapshot {
    query: QueryParameters,
    records: Vec<MarketListingRecord>,
    generation: u64,
    fetched_at: DateTime<Utc>,
}

impl ListingSnapshot {
    pub fn new(query: QueryParameters, records: Vec<MarketListingRecord>, generation: u64) -> Self {
        Self {
            query,
            records,
            generation,
            fetched_at: Utc::now(),
        }
    }

    pub fn query(&self) -> &QueryParameters {
        &self.query
    }

    pub fn records(&self) -> &[MarketListingRecord] {
        &self.records
    }

    /// Request generation that produced this snapshot
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with this name. Names are not guaranteed unique upstream,
    /// so duplicates resolve to the earliest row.
    pub fn find_by_name(&self, name: &str) -> Option<&MarketListingRecord> {
        self.records.iter().find(|record| record.name == name)
    }
}

/// Snapshot lifecycle as seen by the display layer
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState {
    /// A fetch is in flight; `previous` stays readable meanwhile
    Loading {
        previous: Option<Arc<ListingSnapshot>>,
    },
    /// The latest fetch succeeded
    Ready(Arc<ListingSnapshot>),
    /// Every attempt failed and there is no snapshot to fall back to
    Failed { error: String },
}

impl SnapshotState {
    /// Snapshot the display should show, if any
    pub fn snapshot(&self) -> Option<&Arc<ListingSnapshot>> {
        match self {
            SnapshotState::Loading { previous } => previous.as_ref(),
            SnapshotState::Ready(snapshot) => Some(snapshot),
            SnapshotState::Failed { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SnapshotState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SnapshotState::Ready(_))
    }

    /// Moves to `Loading`, keeping whatever snapshot is currently visible
    pub(crate) fn begin_loading(&mut self) {
        let previous = self.snapshot().cloned();
        *self = SnapshotState::Loading { previous };
    }

    /// Settles a failed fetch: back to the visible snapshot, or `Failed`
    pub(crate) fn settle_failure(&mut self, error: String) {
        let previous = self.snapshot().cloned();
        *self = match previous {
            Some(previous) => SnapshotState::Ready(previous),
            None => SnapshotState::Failed { error },
        };
    }
}

impl Default for SnapshotState {
    fn default() -> Self {
        SnapshotState::Loading { previous: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::record;
    use crate::types::{Currency, SortDirection};

    fn snapshot(records: Vec<MarketListingRecord>) -> Arc<ListingSnapshot> {
        let query = QueryParameters::new(Currency::Usd, SortDirection::Desc, 1, 10);
        Arc::new(ListingSnapshot::new(query, records, 1))
    }

    #[test]
    fn test_initial_state_is_empty_loading() {
        let state = SnapshotState::default();
        assert!(state.is_loading());
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn test_loading_keeps_previous_snapshot_visible() {
        let ready = snapshot(vec![record("Bitcoin", 1.0, 2.0)]);
        let mut state = SnapshotState::Ready(ready.clone());
        state.begin_loading();
        assert!(state.is_loading());
        assert_eq!(state.snapshot(), Some(&ready));
    }

    #[test]
    fn test_failure_falls_back_to_previous_or_failed() {
        let ready = snapshot(vec![record("Bitcoin", 1.0, 2.0)]);
        let mut state = SnapshotState::Ready(ready.clone());
        state.begin_loading();
        state.settle_failure("boom".to_string());
        assert_eq!(state, SnapshotState::Ready(ready));

        let mut first = SnapshotState::default();
        first.settle_failure("boom".to_string());
        assert_eq!(
            first,
            SnapshotState::Failed {
                error: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_find_by_name_takes_first_duplicate() {
        let mut dup = record("Wrapped", 2.0, 20.0);
        dup.id = "wrapped-2".to_string();
        let snap = snapshot(vec![record("Wrapped", 1.0, 10.0), dup]);
        assert_eq!(snap.find_by_name("Wrapped").unwrap().id, "wrapped");
        assert!(snap.find_by_name("Missing").is_none());
    }
}
