//! Status enums for orders.
//!
//! Shopify's REST API encodes these as lowercase strings. Each enum is closed
//! with an explicit `Other` case so that a status this crate does not know
//! about is carried as "unrecognized" instead of failing deserialization or
//! being mistaken for a known one.

use serde::{Deserialize, Serialize};

/// Order financial status.
///
/// Maps to Shopify's `financial_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    Pending,
    Authorized,
    PartiallyPaid,
    Paid,
    PartiallyRefunded,
    Refunded,
    Voided,
    Cancelled,
    /// Any value not listed above.
    #[serde(other)]
    Other,
}

impl FinancialStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Refunded => "refunded",
            Self::Voided => "voided",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order fulfillment status.
///
/// Maps to Shopify's `fulfillment_status` values. Shopify sends `null` for
/// orders with no fulfillment activity; that case is modelled as
/// `Option::<FulfillmentStatus>::None` by the records that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    Fulfilled,
    Partial,
    Restocked,
    Unfulfilled,
    /// Any value not listed above.
    #[serde(other)]
    Other,
}

impl FulfillmentStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fulfilled => "fulfilled",
            Self::Partial => "partial",
            Self::Restocked => "restocked",
            Self::Unfulfilled => "unfulfilled",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
