//! CoinGecko market listings source

use crate::{
    config::EngineConfig,
    constants::{COINGECKO_MARKETS_ENDPOINT, USER_AGENT},
    error::FetchError,
    provider::MarketDataSource,
    types::{MarketListingRecord, QueryParameters},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// One element of the `/coins/markets` response array
///
/// Numeric fields are nullable upstream for thinly traded coins.
#[derive(Debug, Deserialize)]
struct CoinMarketEntry {
    id: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    circulating_supply: Option<f64>,
}

impl CoinMarketEntry {
    fn into_record(self) -> Result<MarketListingRecord, FetchError> {
        let current_price = non_negative(&self.id, "current_price", self.current_price)?;
        let market_cap = non_negative(&self.id, "market_cap", self.market_cap)?;
        let circulating_supply =
            non_negative(&self.id, "circulating_supply", self.circulating_supply)?;

        Ok(MarketListingRecord {
            id: self.id,
            name: self.name,
            image_url: self.image.filter(|url| !url.is_empty()),
            current_price,
            market_cap,
            circulating_supply,
        })
    }
}

fn non_negative(id: &str, field: &str, value: Option<f64>) -> Result<f64, FetchError> {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(FetchError::InvalidResponse(format!(
            "{} of {} is not a non-negative number: {}",
            field, id, value
        )));
    }
    Ok(value)
}

/// CoinGecko listings source
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
}

impl CoinGeckoSource {
    /// Creates a new CoinGecko source from the engine configuration
    pub fn new(config: &EngineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Builds the listings URL for the given query
    fn build_url(&self, query: &QueryParameters) -> String {
        format!(
            "{}{}?vs_currency={}&order={}&per_page={}&page={}&sparkline=false",
            self.base_url,
            COINGECKO_MARKETS_ENDPOINT,
            query.currency.code(),
            query.sort_direction.order_param(),
            query.page_size,
            query.page
        )
    }

    /// Parses the response body into listing records, preserving order
    fn parse_response(&self, body: &str) -> Result<Vec<MarketListingRecord>, FetchError> {
        let entries: Vec<CoinMarketEntry> = serde_json::from_str(body).map_err(|e| {
            FetchError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e, body
            ))
        })?;

        entries.into_iter().map(CoinMarketEntry::into_record).collect()
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new(&EngineConfig::default()).expect("Failed to create CoinGecko source")
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    async fn fetch_listings(
        &self,
        query: &QueryParameters,
    ) -> Result<Vec<MarketListingRecord>, FetchError> {
        let url = self.build_url(query);
        tracing::debug!(%url, "Fetching listings from CoinGecko");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(e)
            }
        })?;

        // Check for rate limiting
        if response.status().as_u16() == 429 {
            return Err(FetchError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(FetchError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await.map_err(FetchError::Network)?;
        let records = self.parse_response(&body)?;

        tracing::debug!(
            count = records.len(),
            currency = %query.currency,
            page = query.page,
            "Fetched listings from CoinGecko"
        );

        Ok(records)
    }

    fn source_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, SortDirection};

    #[test]
    fn test_build_url() {
        let source = CoinGeckoSource::default();
        let query = QueryParameters::new(Currency::Eur, SortDirection::Asc, 3, 25);
        assert_eq!(
            source.build_url(&query),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=eur&order=market_cap_asc&per_page=25&page=3&sparkline=false"
        );
    }

    #[test]
    fn test_build_url_uses_configured_base() {
        let config = EngineConfig {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            ..EngineConfig::default()
        };
        let source = CoinGeckoSource::new(&config).unwrap();
        let url = source.build_url(&config.initial_query);
        assert!(url.starts_with("http://127.0.0.1:8080/coins/markets?vs_currency=usd&order=market_cap_desc"));
    }

    #[test]
    fn test_parse_response_keeps_order_and_fields() {
        let source = CoinGeckoSource::default();
        let body = r#"[
            {"id": "bitcoin", "name": "Bitcoin", "image": "https://img/btc.png",
             "current_price": 50000.0, "market_cap": 1000000000000, "circulating_supply": 20000000,
             "total_volume": 123, "sparkline_in_7d": null},
            {"id": "ethereum", "name": "Ethereum", "image": "",
             "current_price": 3000, "market_cap": 400000000000, "circulating_supply": null}
        ]"#;

        let records = source.parse_response(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "bitcoin");
        assert_eq!(records[0].image_url.as_deref(), Some("https://img/btc.png"));
        assert_eq!(records[0].market_cap, 1_000_000_000_000.0);
        assert_eq!(records[1].name, "Ethereum");
        assert_eq!(records[1].image_url, None);
        assert_eq!(records[1].circulating_supply, 0.0);
    }

    #[test]
    fn test_parse_response_rejects_negative_values() {
        let source = CoinGeckoSource::default();
        let body = r#"[{"id": "x", "name": "X", "current_price": -1, "market_cap": 5}]"#;
        assert!(matches!(
            source.parse_response(body),
            Err(FetchError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_response_rejects_non_array() {
        let source = CoinGeckoSource::default();
        let body = r#"{"status": {"error_code": 429}}"#;
        assert!(matches!(
            source.parse_response(body),
            Err(FetchError::InvalidResponse(_))
        ));
    }
}
