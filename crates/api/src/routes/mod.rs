//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                              - Liveness
//! GET   /api/health                          - Service status
//!
//! # Products
//! GET   /api/products                        - One catalog page (?limit&page_info)
//! GET   /api/products/low-stock              - Low-stock view (?threshold&limit)
//! GET   /api/products/best-selling           - Best sellers (?limit)
//! GET   /api/products/worst-selling          - Worst sellers (?limit)
//! GET   /api/products/{id}                   - Single product
//! GET   /api/best-selling                    - 301 to /api/products/best-selling
//! GET   /api/worst-selling                   - 301 to /api/products/worst-selling
//!
//! # Orders
//! GET   /api/orders                          - Normalized orders (?limit&status&fulfillment_status)
//! GET   /api/orders/pending                  - Unfulfilled, else most recent
//! GET   /api/orders/date-range               - ?start_date&end_date[&limit&status]
//! GET   /api/orders/{id}                     - Single normalized order
//!
//! # Customers
//! GET   /api/customers                       - Customer page (?limit)
//! GET   /api/customers/stats                 - Spend and order statistics
//! GET   /api/customers/{id}                  - Single customer
//!
//! # Notifications
//! GET   /api/notifications                   - Recent-order notifications (?hours&limit)
//! GET   /api/notifications/stats             - Read/archived counts
//! PATCH /api/notifications/{id}/read         - Mark read
//! PATCH /api/notifications/{id}/archive      - Archive
//! PATCH /api/notifications/mark-all-read     - Mark all non-archived read
//!
//! # Auth (enabled by SHOPIFY_API_KEY / SHOPIFY_API_SECRET)
//! GET   /api/auth/shopify-login              - OAuth authorize URL
//! POST  /api/auth/callback                   - Exchange code for token
//! POST  /api/auth/logout                     - Acknowledge logout
//! GET   /api/auth/verify                     - Check a token (?shop&access_token)
//! ```

pub mod auth;
pub mod customers;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod products;

use axum::Router;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::state::AppState;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(notifications::router())
        .merge(auth::router())
}

/// Success envelope: `{"success": true, "data": ..., "count": n, ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Extra top-level fields (pagination, threshold, ...).
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            meta: Map::new(),
        }
    }

    /// Add a top-level field next to `data`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// Envelope for a list, with `count` set.
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Self::new(data)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope_shape() {
        let envelope = Envelope::list(vec![1, 2, 3]).with("threshold", 5);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "success": true, "data": [1, 2, 3], "count": 3, "threshold": 5 })
        );
    }

    #[test]
    fn test_single_envelope_has_no_count() {
        let json = serde_json::to_value(Envelope::new("x")).unwrap();
        assert!(json.get("count").is_none());
        assert_eq!(json["data"], "x");
    }
}
