//! Two-slot comparison selection

use crate::{
    error::SelectionError,
    snapshot::ListingSnapshot,
    types::{EntityQuote, SelectionSlot},
};
use serde::Serialize;

/// The two entities being compared
///
/// Slots hold value copies taken at selection time; they do not follow
/// later snapshots unless a reseed overwrites them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSelection {
    entity_a: Option<EntityQuote>,
    entity_b: Option<EntityQuote>,
}

impl ComparisonSelection {
    pub fn new(entity_a: Option<EntityQuote>, entity_b: Option<EntityQuote>) -> Self {
        Self { entity_a, entity_b }
    }

    /// Default selection for a fresh snapshot: first and second rows
    pub fn seeded_from(snapshot: &ListingSnapshot) -> Self {
        let records = snapshot.records();
        Self {
            entity_a: records.first().map(EntityQuote::from),
            entity_b: records.get(1).map(EntityQuote::from),
        }
    }

    pub fn entity_a(&self) -> Option<&EntityQuote> {
        self.entity_a.as_ref()
    }

    pub fn entity_b(&self) -> Option<&EntityQuote> {
        self.entity_b.as_ref()
    }

    pub fn get(&self, slot: SelectionSlot) -> Option<&EntityQuote> {
        match slot {
            SelectionSlot::A => self.entity_a(),
            SelectionSlot::B => self.entity_b(),
        }
    }

    /// Both slots, when filled
    pub fn pair(&self) -> Option<(&EntityQuote, &EntityQuote)> {
        Some((self.entity_a.as_ref()?, self.entity_b.as_ref()?))
    }

    /// Overwrites both slots from the snapshot's first two records
    pub fn reseed(&mut self, snapshot: &ListingSnapshot) {
        *self = Self::seeded_from(snapshot);
    }

    /// Assigns the first record named `name` to `slot`. On a miss the
    /// selection is left untouched.
    pub fn select(
        &mut self,
        slot: SelectionSlot,
        name: &str,
        snapshot: &ListingSnapshot,
    ) -> Result<&EntityQuote, SelectionError> {
        let record = snapshot
            .find_by_name(name)
            .ok_or_else(|| SelectionError::lookup_miss(name))?;

        let target = match slot {
            SelectionSlot::A => &mut self.entity_a,
            SelectionSlot::B => &mut self.entity_b,
        };
        Ok(target.insert(EntityQuote::from(record)))
    }

    pub fn select_entity_a(
        &mut self,
        name: &str,
        snapshot: &ListingSnapshot,
    ) -> Result<&EntityQuote, SelectionError> {
        self.select(SelectionSlot::A, name, snapshot)
    }

    pub fn select_entity_b(
        &mut self,
        name: &str,
        snapshot: &ListingSnapshot,
    ) -> Result<&EntityQuote, SelectionError> {
        self.select(SelectionSlot::B, name, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::record;
    use crate::types::{Currency, QueryParameters, SortDirection};

    fn snapshot() -> ListingSnapshot {
        let query = QueryParameters::new(Currency::Usd, SortDirection::Desc, 1, 10);
        ListingSnapshot::new(
            query,
            vec![
                record("Bitcoin", 50_000.0, 1e12),
                record("Ethereum", 3_000.0, 4e11),
                record("Solana", 150.0, 7e10),
            ],
            1,
        )
    }

    #[test]
    fn test_seed_takes_first_two_records() {
        let selection = ComparisonSelection::seeded_from(&snapshot());
        assert_eq!(selection.entity_a().unwrap().name, "Bitcoin");
        assert_eq!(selection.entity_b().unwrap().name, "Ethereum");
    }

    #[test]
    fn test_seed_with_single_record_leaves_b_empty() {
        let query = QueryParameters::new(Currency::Usd, SortDirection::Desc, 1, 10);
        let snap = ListingSnapshot::new(query, vec![record("Bitcoin", 1.0, 1.0)], 1);
        let selection = ComparisonSelection::seeded_from(&snap);
        assert!(selection.entity_a().is_some());
        assert!(selection.entity_b().is_none());
        assert!(selection.pair().is_none());
    }

    #[test]
    fn test_select_copies_values_into_slot() {
        let snap = snapshot();
        let mut selection = ComparisonSelection::seeded_from(&snap);

        let quote = selection.select_entity_b("Solana", &snap).unwrap().clone();
        assert_eq!(quote, EntityQuote::new("Solana", 150.0, 7e10));
        assert_eq!(selection.entity_a().unwrap().name, "Bitcoin");
        assert_eq!(selection.get(SelectionSlot::B), Some(&quote));
    }

    #[test]
    fn test_select_miss_leaves_selection_unchanged() {
        let snap = snapshot();
        let mut selection = ComparisonSelection::seeded_from(&snap);
        let before = selection.clone();

        let err = selection.select_entity_a("Dogecoin", &snap).unwrap_err();
        assert_eq!(err, SelectionError::lookup_miss("Dogecoin"));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_reseed_discards_user_choice() {
        let snap = snapshot();
        let mut selection = ComparisonSelection::seeded_from(&snap);
        selection.select_entity_a("Solana", &snap).unwrap();

        selection.reseed(&snap);
        assert_eq!(selection, ComparisonSelection::seeded_from(&snap));
    }
}
