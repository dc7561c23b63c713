//! Display helpers for the comparison card and the listings table

use crate::{
    error::MetricsError,
    selection::ComparisonSelection,
    types::{Currency, DerivedMetrics, MarketListingRecord},
};

/// Shown wherever a derived figure cannot be computed
pub const UNDEFINED: &str = "undefined";

/// Sign-based styling hint for a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Formats the cap ratio as `x2.50` (`-x2.50` when A is smaller)
pub fn format_ratio(metrics: &Result<DerivedMetrics, MetricsError>) -> String {
    match metrics {
        Ok(metrics) if metrics.cap_ratio < 0.0 => format!("-x{:.2}", -metrics.cap_ratio),
        Ok(metrics) => format!("x{:.2}", metrics.cap_ratio),
        Err(_) => UNDEFINED.to_string(),
    }
}

/// Formats a currency-denominated figure, e.g. `20000.00 usd`
pub fn format_amount(value: Result<f64, &MetricsError>, currency: Currency) -> String {
    match value {
        Ok(value) => format!("{:.2} {}", value, currency),
        Err(_) => UNDEFINED.to_string(),
    }
}

/// The table's price cell, e.g. `50000 usd`
pub fn format_price(record: &MarketListingRecord, currency: Currency) -> String {
    format!("{} {}", record.current_price, currency)
}

/// Question shown above the ratio, e.g.
/// `How many times Bitcoin market cap is bigger than Ethereum?`
pub fn comparison_headline(
    selection: &ComparisonSelection,
    metrics: &Result<DerivedMetrics, MetricsError>,
) -> String {
    let name_a = selection.entity_a().map(|e| e.name.as_str()).unwrap_or("?");
    let name_b = selection.entity_b().map(|e| e.name.as_str()).unwrap_or("?");
    let relation = match metrics {
        Ok(metrics) if metrics.cap_ratio > 0.0 => "bigger",
        _ => "smaller",
    };
    format!(
        "How many times {} market cap is {} than {}?",
        name_a, relation, name_b
    )
}

/// Highlight for the slot A and slot B names: the bigger one is positive,
/// the other negative. Equal caps mark both negative; undefined metrics
/// mark both neutral.
pub fn slot_sentiments(metrics: &Result<DerivedMetrics, MetricsError>) -> (Sentiment, Sentiment) {
    match metrics {
        Ok(metrics) => {
            let highlight = |bigger: bool| {
                if bigger {
                    Sentiment::Positive
                } else {
                    Sentiment::Negative
                }
            };
            (highlight(metrics.cap_ratio > 0.0), highlight(metrics.cap_ratio < 0.0))
        }
        Err(_) => (Sentiment::Neutral, Sentiment::Neutral),
    }
}
