//! Order records and the filters `orders.json` accepts.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storelens_core::{
    FinancialStatus, FulfillmentStatus, LineItemId, OrderId, ProductId, VariantId, parse_amount,
};

use super::common::Address;
use super::customer::Customer;

/// Fields requested from `orders.json`. Keeps payloads to what the views use.
pub const ORDER_FIELDS: &[&str] = &[
    "id",
    "order_number",
    "name",
    "email",
    "phone",
    "created_at",
    "updated_at",
    "processed_at",
    "cancelled_at",
    "closed_at",
    "financial_status",
    "fulfillment_status",
    "total_price",
    "subtotal_price",
    "total_tax",
    "currency",
    "line_items",
    "customer",
    "shipping_address",
    "billing_address",
    "note",
    "tags",
    "source_name",
];

// =============================================================================
// Order
// =============================================================================

/// An order as returned by the Admin REST API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    /// Missing only on malformed records.
    pub id: Option<OrderId>,
    pub order_number: Option<i64>,
    /// Display label, e.g. `#1001`.
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub processed_at: Option<DateTime<FixedOffset>>,
    pub cancelled_at: Option<DateTime<FixedOffset>>,
    pub closed_at: Option<DateTime<FixedOffset>>,
    pub financial_status: Option<FinancialStatus>,
    /// `None` when Shopify reports `null` (no fulfillment activity).
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub total_price: Option<String>,
    pub subtotal_price: Option<String>,
    pub total_tax: Option<String>,
    pub currency: Option<String>,
    /// Absent for guest checkouts.
    pub customer: Option<Customer>,
    pub line_items: Vec<LineItem>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub note: Option<String>,
    pub tags: Option<String>,
    pub source_name: Option<String>,
}

impl Order {
    /// Parsed `total_price`, `None` if absent or malformed.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        parse_amount(self.total_price.as_deref())
    }

    /// Paid but nothing shipped yet.
    ///
    /// Compares the raw fulfillment status, so a `null` status does not count.
    #[must_use]
    pub fn awaits_fulfillment(&self) -> bool {
        self.financial_status == Some(FinancialStatus::Paid)
            && self.fulfillment_status == Some(FulfillmentStatus::Unfulfilled)
    }
}

/// One line of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: Option<LineItemId>,
    /// `None` when the product has since been deleted.
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub quantity: u32,
    pub price: Option<String>,
    pub total_discount: Option<String>,
    pub vendor: Option<String>,
    pub sku: Option<String>,
}

impl LineItem {
    /// Label for summaries: `name`, falling back to `title`.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }
}

// =============================================================================
// Query Filters
// =============================================================================

/// Error for a filter value Shopify would not accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} {value:?}: expected one of {expected}")]
pub struct InvalidFilter {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// `status` filter for `orders.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderStatusFilter {
    #[default]
    Any,
    Open,
    Closed,
    Cancelled,
    Pending,
}

impl OrderStatusFilter {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for OrderStatusFilter {
    type Err = InvalidFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            "pending" => Ok(Self::Pending),
            _ => Err(InvalidFilter {
                field: "status",
                value: s.to_string(),
                expected: "any, open, closed, cancelled, pending",
            }),
        }
    }
}

/// `fulfillment_status` filter for `orders.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentFilter {
    Fulfilled,
    /// Orders with no fulfillment activity.
    Null,
    Partial,
    Restocked,
    Unfulfilled,
}

impl FulfillmentFilter {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fulfilled => "fulfilled",
            Self::Null => "null",
            Self::Partial => "partial",
            Self::Restocked => "restocked",
            Self::Unfulfilled => "unfulfilled",
        }
    }
}

impl FromStr for FulfillmentFilter {
    type Err = InvalidFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fulfilled" => Ok(Self::Fulfilled),
            "null" => Ok(Self::Null),
            "partial" => Ok(Self::Partial),
            "restocked" => Ok(Self::Restocked),
            "unfulfilled" => Ok(Self::Unfulfilled),
            _ => Err(InvalidFilter {
                field: "fulfillment_status",
                value: s.to_string(),
                expected: "fulfilled, null, partial, restocked, unfulfilled",
            }),
        }
    }
}

/// Parameters for a single `orders.json` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub limit: u32,
    pub status: OrderStatusFilter,
    pub fulfillment_status: Option<FulfillmentFilter>,
    pub created_at_min: Option<DateTime<FixedOffset>>,
}

impl OrderQuery {
    /// Any-status query for up to `limit` orders.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            status: OrderStatusFilter::Any,
            fulfillment_status: None,
            created_at_min: None,
        }
    }

    #[must_use]
    pub const fn status(mut self, status: OrderStatusFilter) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn fulfillment_status(mut self, filter: FulfillmentFilter) -> Self {
        self.fulfillment_status = Some(filter);
        self
    }

    #[must_use]
    pub const fn created_at_min(mut self, min: DateTime<FixedOffset>) -> Self {
        self.created_at_min = Some(min);
        self
    }

    /// Query-string pairs in the order Shopify documents them.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("status", self.status.as_str().to_string()),
            ("fields", ORDER_FIELDS.join(",")),
        ];
        if let Some(filter) = self.fulfillment_status {
            params.push(("fulfillment_status", filter.as_str().to_string()));
        }
        if let Some(min) = self.created_at_min {
            params.push(("created_at_min", min.to_rfc3339()));
        }
        params
    }
}
