//! StoreLens Core - Shared domain types.
//!
//! This crate provides the types shared by the StoreLens API and its tests:
//! - `api` - Backend-for-frontend for the analytics dashboard
//! - `integration-tests` - End-to-end tests against a mock Shopify
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Shopify
//! wire records live in the API crate; the values here are the vocabulary
//! those records are interpreted through.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, order statuses, inventory levels, and amounts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
