//! Core types for StoreLens.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod inventory;
pub mod price;
pub mod status;

pub use id::*;
pub use inventory::InventoryQuantity;
pub use price::{DEFAULT_CURRENCY, parse_amount};
pub use status::*;
