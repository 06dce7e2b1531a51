//! Types shared across resources, plus the shop/user records used by OAuth.

use serde::{Deserialize, Serialize};
use storelens_core::ImageId;

// =============================================================================
// Address & Image
// =============================================================================

/// A postal address as attached to orders and customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

impl Address {
    /// Recipient name: the explicit `name`, else "first last".
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: Option<ImageId>,
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
}

/// Join optional first/last name parts, trimmed. `None` when both are blank.
#[must_use]
pub fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Shop & Staff User
// =============================================================================

/// Store details from `shop.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Shop {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub domain: Option<String>,
    pub myshopify_domain: Option<String>,
    pub plan_name: Option<String>,
    pub currency: Option<String>,
    pub iana_timezone: Option<String>,
}

/// The staff account that owns an access token, from `users/current.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopUser {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub account_owner: Option<bool>,
}
