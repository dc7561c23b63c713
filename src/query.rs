//! Query parameter state for the listings fetch

use crate::types::{Currency, QueryParameters, SortDirection};

/// Holds the current [`QueryParameters`].
///
/// Changing currency or sort direction moves back to page 1 since the old
/// page index refers to a differently ordered list. Every setter returns the
/// resulting parameters so the caller can issue the fetch for them.
#[derive(Debug, Clone)]
pub struct QueryParameterStore {
    current: QueryParameters,
}

impl QueryParameterStore {
    pub fn new(initial: QueryParameters) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> QueryParameters {
        self.current
    }

    pub fn set_currency(&mut self, currency: Currency) -> QueryParameters {
        self.current.currency = currency;
        self.current.page = 1;
        self.current
    }

    pub fn set_sort_direction(&mut self, sort_direction: SortDirection) -> QueryParameters {
        self.current.sort_direction = sort_direction;
        self.current.page = 1;
        self.current
    }

    /// Pages are 1-based; 0 is treated as 1
    pub fn set_page(&mut self, page: u32) -> QueryParameters {
        self.current.page = page.max(1);
        self.current
    }

    pub fn set_page_size(&mut self, page_size: u32) -> QueryParameters {
        self.current.page_size = page_size.max(1);
        self.current
    }

    /// Applies a pagination control change in one step
    pub fn set_pagination(&mut self, page: u32, page_size: u32) -> QueryParameters {
        self.current.page = page.max(1);
        self.current.page_size = page_size.max(1);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_on_page(page: u32) -> QueryParameterStore {
        QueryParameterStore::new(QueryParameters::new(
            Currency::Usd,
            SortDirection::Desc,
            page,
            10,
        ))
    }

    #[test]
    fn test_currency_change_resets_page() {
        let mut store = store_on_page(4);
        let query = store.set_currency(Currency::Eur);
        assert_eq!(query.currency, Currency::Eur);
        assert_eq!(query.page, 1);
        assert_eq!(query.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_change_resets_page() {
        let mut store = store_on_page(7);
        let query = store.set_sort_direction(SortDirection::Asc);
        assert_eq!(query.sort_direction, SortDirection::Asc);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_pagination_leaves_currency_and_sort() {
        let mut store = store_on_page(1);
        store.set_currency(Currency::Eur);
        store.set_sort_direction(SortDirection::Asc);

        let query = store.set_pagination(3, 50);
        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 50);
        assert_eq!(query.currency, Currency::Eur);
        assert_eq!(query.sort_direction, SortDirection::Asc);

        assert_eq!(store.set_page(0).page, 1);
        assert_eq!(store.set_page_size(0).page_size, 1);
        assert_eq!(store.current().page_size, 1);
    }
}
