//! Customer records.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storelens_core::{CustomerId, parse_amount};

use super::common::{Address, join_name};

/// A customer, either embedded in an order or from `customers.json`.
///
/// Orders carry a trimmed-down copy, so the statistics fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub total_spent: Option<String>,
    #[serde(default)]
    pub orders_count: Option<u64>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub default_address: Option<Address>,
}

impl Customer {
    /// "first last", trimmed; `None` if both parts are blank.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    /// Lifetime spend, zero when absent or malformed.
    #[must_use]
    pub fn spent(&self) -> Decimal {
        parse_amount(self.total_spent.as_deref()).unwrap_or_default()
    }
}
