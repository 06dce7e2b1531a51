//! Product and variant records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use storelens_core::{InventoryQuantity, ProductId, VariantId};

use super::common::Image;

/// A product with its variants and images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub published_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub image: Option<Image>,
}

impl Product {
    /// Featured image URL: `image`, else the first of `images`.
    #[must_use]
    pub fn image_src(&self) -> Option<&str> {
        self.image
            .as_ref()
            .or_else(|| self.images.first())
            .map(|image| image.src.as_str())
    }

    /// Price of the first variant, as Shopify formats it.
    #[must_use]
    pub fn price(&self) -> Option<&str> {
        self.variants.first().and_then(|v| v.price.as_deref())
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    /// Raw count; `-1` means tracking is disabled.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

impl Variant {
    #[must_use]
    pub const fn inventory(&self) -> InventoryQuantity {
        InventoryQuantity::from_raw(self.inventory_quantity)
    }
}
