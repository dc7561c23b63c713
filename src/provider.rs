//! Data source abstraction for fetching market listings from external APIs

use crate::{
    error::FetchError,
    types::{MarketListingRecord, QueryParameters},
};
use async_trait::async_trait;

/// Trait for market listing sources
///
/// A source maps one set of query parameters to one page of listing
/// records. Implementations issue a single request per call and never
/// retry; retry policy belongs to the engine.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches one page of listings
    ///
    /// # Arguments
    /// * `query` - Currency, market-cap ordering and pagination to request
    ///
    /// # Returns
    /// Records in the order the source returned them, or an error if the fetch fails
    async fn fetch_listings(
        &self,
        query: &QueryParameters,
    ) -> Result<Vec<MarketListingRecord>, FetchError>;

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;
}
