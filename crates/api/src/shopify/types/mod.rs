//! Record types for the Shopify Admin REST API.
//!
//! These mirror the JSON that `orders.json`, `products.json` and
//! `customers.json` return. Every field Shopify may omit or null out is an
//! `Option`, so a sparse record deserializes instead of failing the whole
//! page.

pub mod common;
pub mod customer;
pub mod order;
pub mod product;

pub use common::*;
pub use customer::*;
pub use order::*;
pub use product::*;
