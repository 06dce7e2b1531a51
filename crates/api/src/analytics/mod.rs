//! Derived views over fetched Shopify snapshots.
//!
//! Everything here except [`notifications::NotificationService`] is a pure
//! function of its inputs. Upstream failures are propagated unchanged; a
//! single failed call fails the whole view.

pub mod customers;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod sales;

use storelens_core::{OrderId, ProductId};

use crate::config::ShopifyConfig;

/// Builds admin and storefront links for orders and products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrls {
    store: String,
    storefront: String,
}

impl StoreUrls {
    #[must_use]
    pub fn new(store: impl Into<String>, storefront: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            storefront: storefront.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ShopifyConfig) -> Self {
        Self::new(config.store.clone(), config.storefront_domain.clone())
    }

    #[must_use]
    pub fn admin_order(&self, id: OrderId) -> String {
        format!("https://{}/admin/orders/{id}", self.store)
    }

    #[must_use]
    pub fn admin_product(&self, id: ProductId) -> String {
        format!("https://{}/admin/products/{id}", self.store)
    }

    /// `None` when the order has no number.
    #[must_use]
    pub fn public_order(&self, order_number: Option<i64>) -> Option<String> {
        order_number.map(|number| format!("https://{}/orders/{number}", self.storefront))
    }

    /// `None` when the product has no handle.
    #[must_use]
    pub fn public_product(&self, handle: Option<&str>) -> Option<String> {
        handle
            .filter(|h| !h.is_empty())
            .map(|h| format!("https://{}/products/{h}", self.storefront))
    }
}
