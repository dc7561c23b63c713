//! Derived valuation metrics for a comparison selection

use crate::{
    error::MetricsError,
    selection::ComparisonSelection,
    types::{DerivedMetrics, EntityQuote},
};
use std::cmp::Ordering;

/// Computes the derived metrics for a selection
///
/// Fails with `IncompleteSelection` when a slot is empty.
pub fn compute(selection: &ComparisonSelection) -> Result<DerivedMetrics, MetricsError> {
    let (a, b) = selection.pair().ok_or(MetricsError::IncompleteSelection)?;
    compare(a, b)
}

/// Computes the derived metrics of `a` relative to `b`
///
/// ```text
/// cap_ratio                       =  capA / capB     if capA > capB
///                                   -(capB / capA)   if capA < capB
///                                    0               if capA == capB
/// entity_a_value_at_entity_b_cap  =  priceA * (capB / capA)
/// entity_a_cap_at_entity_b_price  =  capA * (priceB / priceA)
/// ```
///
/// Equal caps compare exactly; upstream figures are already rounded. Any
/// zero in a denominator position is reported as `DegenerateInput` instead
/// of yielding an infinite or NaN figure.
pub fn compare(a: &EntityQuote, b: &EntityQuote) -> Result<DerivedMetrics, MetricsError> {
    let (cap_a, price_a) = (a.market_cap, a.current_price);
    let (cap_b, price_b) = (b.market_cap, b.current_price);

    if cap_a == 0.0 {
        return Err(MetricsError::degenerate(format!(
            "market cap of {} is zero",
            a.name
        )));
    }
    if price_a == 0.0 {
        return Err(MetricsError::degenerate(format!("price of {} is zero", a.name)));
    }

    let cap_ratio = match cap_a.partial_cmp(&cap_b) {
        Some(Ordering::Greater) => {
            if cap_b == 0.0 {
                return Err(MetricsError::degenerate(format!(
                    "market cap of {} is zero",
                    b.name
                )));
            }
            cap_a / cap_b
        }
        Some(Ordering::Less) => -(cap_b / cap_a),
        Some(Ordering::Equal) => 0.0,
        None => {
            return Err(MetricsError::degenerate(format!(
                "market caps of {} and {} are not comparable",
                a.name, b.name
            )))
        }
    };

    let metrics = DerivedMetrics {
        cap_ratio,
        entity_a_value_at_entity_b_cap: price_a * (cap_b / cap_a),
        entity_a_cap_at_entity_b_price: cap_a * (price_b / price_a),
    };

    if !(metrics.cap_ratio.is_finite()
        && metrics.entity_a_value_at_entity_b_cap.is_finite()
        && metrics.entity_a_cap_at_entity_b_price.is_finite())
    {
        return Err(MetricsError::degenerate("derived value is not finite"));
    }

    Ok(metrics)
}
