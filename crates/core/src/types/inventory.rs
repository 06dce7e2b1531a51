//! Variant inventory levels.
//!
//! Shopify reports `inventory_quantity` as a signed integer where `-1` means
//! inventory tracking is disabled for the variant (unlimited stock). `0` is
//! out of stock and is a perfectly valid tracked value.

use serde::{Deserialize, Serialize};

/// Raw sentinel Shopify uses for "tracking disabled".
pub const UNTRACKED_SENTINEL: i64 = -1;

/// Interpreted inventory level of a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum InventoryQuantity {
    /// Tracking disabled (`-1`) or no value reported.
    Untracked,
    /// Tracked count. May be negative when the variant is oversold.
    Tracked(i64),
}

impl InventoryQuantity {
    /// Interpret a raw `inventory_quantity` value.
    #[must_use]
    pub const fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None | Some(UNTRACKED_SENTINEL) => Self::Untracked,
            Some(quantity) => Self::Tracked(quantity),
        }
    }

    /// Tracked count, or `None` when untracked.
    #[must_use]
    pub const fn tracked(&self) -> Option<i64> {
        match self {
            Self::Untracked => None,
            Self::Tracked(quantity) => Some(*quantity),
        }
    }

    /// Whether this level counts as low stock: tracked and within
    /// `0..=threshold`. Untracked variants are never low.
    #[must_use]
    pub const fn is_low(&self, threshold: i64) -> bool {
        match self {
            Self::Untracked => false,
            Self::Tracked(quantity) => *quantity >= 0 && *quantity <= threshold,
        }
    }
}
