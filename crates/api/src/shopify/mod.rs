//! Shopify Admin REST API client.
//!
//! # Security
//!
//! The Admin API token grants read access to orders, customers and
//! inventory. It is held as a [`secrecy::SecretString`] and only ever sent in
//! the `X-Shopify-Access-Token` header.
//!
//! # Example
//!
//! ```rust,ignore
//! use storelens_api::shopify::{AdminClient, OrderQuery};
//!
//! let client = AdminClient::new(&config.shopify)?;
//! let orders = client.list_orders(&OrderQuery::new(50)).await?;
//! let page = client.list_products(250, None).await?;
//! ```

mod client;
pub mod pagination;
pub mod types;

pub use client::{AccessToken, AdminClient, ProductPage};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Request never produced a response (DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-2xx status.
    #[error("Shopify API returned {status}")]
    Upstream {
        status: u16,
        /// Response body, as JSON when it parses, else as a string.
        details: serde_json::Value,
    },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Body did not match the expected record shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ShopifyError {
    /// Upstream HTTP status, when Shopify sent one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::NotFound(_) => Some(404),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }

    /// Raw upstream payload for the error body.
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Upstream { details, .. } => details.clone(),
            Self::RateLimited(secs) => serde_json::json!({ "retry_after": secs }),
            Self::NotFound(what) => serde_json::Value::String(what.clone()),
            Self::Http(e) => serde_json::Value::String(e.to_string()),
            Self::Parse(e) => serde_json::Value::String(e.to_string()),
        }
    }
}
