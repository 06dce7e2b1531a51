//! Decimal amounts as Shopify sends them.
//!
//! The REST API encodes every monetary value as a decimal string
//! (`"19.99"`). Amounts are parsed into [`Decimal`] so sums stay exact.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Currency assumed when an order does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Parse a Shopify decimal string.
///
/// Returns `None` for absent, empty, or malformed values.
#[must_use]
pub fn parse_amount(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).ok()
}
