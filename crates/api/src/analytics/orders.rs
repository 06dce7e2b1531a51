//! Normalized order view and the pending-orders fallback.

use std::cmp::Reverse;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use storelens_core::{
    CustomerId, FinancialStatus, FulfillmentStatus, LineItemId, OrderId, ProductId, VariantId,
};
use tracing::instrument;

use super::StoreUrls;
use crate::shopify::{
    AdminClient, Address, Customer, FulfillmentFilter, LineItem, Order, OrderQuery, ShopifyError,
};

/// Orders fetched and returned by the pending view.
pub const PENDING_LIMIT: u32 = 50;

/// Display name for orders without a named customer.
pub const GUEST_NAME: &str = "Guest";

// =============================================================================
// Output shape
// =============================================================================

/// An order flattened for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrder {
    pub id: OrderId,
    pub order_number: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub processed_at: Option<DateTime<FixedOffset>>,
    pub cancelled_at: Option<DateTime<FixedOffset>>,
    pub closed_at: Option<DateTime<FixedOffset>>,
    pub financial_status: Option<FinancialStatus>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub total_price: Option<String>,
    pub subtotal_price: Option<String>,
    pub total_tax: Option<String>,
    pub currency: Option<String>,
    pub customer: OrderCustomer,
    pub shipping_address: Option<ShippingAddress>,
    pub line_items: Vec<OrderLine>,
    pub note: Option<String>,
    pub tags: Option<String>,
    pub source_name: Option<String>,
    pub admin_url: String,
    pub public_url: Option<String>,
    /// `"{qty}x {name}"` per line, comma separated.
    pub summary: String,
}

/// Customer as shown on an order. Guests have no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCustomer {
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: Option<LineItemId>,
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub quantity: u32,
    pub price: Option<String>,
    pub total_discount: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

fn order_customer(order: &Order) -> OrderCustomer {
    let customer: Option<&Customer> = order.customer.as_ref();
    let email = customer
        .and_then(|c| c.email.clone())
        .or_else(|| order.email.clone());

    let name = customer
        .and_then(Customer::full_name)
        .or_else(|| email.clone().filter(|e| !e.is_empty()))
        .unwrap_or_else(|| GUEST_NAME.to_string());

    OrderCustomer {
        id: customer.map(|c| c.id),
        name,
        email,
        phone: customer
            .and_then(|c| c.phone.clone())
            .or_else(|| order.phone.clone()),
    }
}

fn shipping_address(address: &Address) -> ShippingAddress {
    ShippingAddress {
        name: address.display_name(),
        address1: address.address1.clone(),
        city: address.city.clone(),
        province: address.province.clone(),
        country: address.country.clone(),
        zip: address.zip.clone(),
    }
}

fn order_line(item: &LineItem) -> OrderLine {
    OrderLine {
        id: item.id,
        product_id: item.product_id,
        variant_id: item.variant_id,
        name: item.name.clone(),
        title: item.title.clone(),
        quantity: item.quantity,
        price: item.price.clone(),
        total_discount: item.total_discount.clone(),
    }
}

/// `"2x Mug, 1x Hoodie"`.
#[must_use]
pub fn order_summary(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}x {}", item.quantity, item.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flatten a raw order. `None` when the order has no id.
#[must_use]
pub fn normalize_order(order: &Order, urls: &StoreUrls) -> Option<NormalizedOrder> {
    let id = order.id?;

    Some(NormalizedOrder {
        id,
        order_number: order.order_number,
        name: order.name.clone(),
        email: order.email.clone(),
        phone: order.phone.clone(),
        created_at: order.created_at,
        updated_at: order.updated_at,
        processed_at: order.processed_at,
        cancelled_at: order.cancelled_at,
        closed_at: order.closed_at,
        financial_status: order.financial_status,
        fulfillment_status: order.fulfillment_status,
        total_price: order.total_price.clone(),
        subtotal_price: order.subtotal_price.clone(),
        total_tax: order.total_tax.clone(),
        currency: order.currency.clone(),
        customer: order_customer(order),
        shipping_address: order.shipping_address.as_ref().map(shipping_address),
        line_items: order.line_items.iter().map(order_line).collect(),
        note: order.note.clone(),
        tags: order.tags.clone(),
        source_name: order.source_name.clone(),
        admin_url: urls.admin_order(id),
        public_url: urls.public_order(order.order_number),
        summary: order_summary(&order.line_items),
    })
}

/// Normalize a batch, dropping orders without an id.
#[must_use]
pub fn normalize_orders(orders: &[Order], urls: &StoreUrls) -> Vec<NormalizedOrder> {
    orders
        .iter()
        .filter_map(|order| {
            let normalized = normalize_order(order, urls);
            if normalized.is_none() {
                tracing::warn!(name = ?order.name, "Skipping order without id");
            }
            normalized
        })
        .collect()
}

/// Newest first; orders without a timestamp go last. Stable.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| Reverse(order.created_at));
}

// =============================================================================
// Pending orders
// =============================================================================

/// Unfulfilled orders, or the most recent orders if none are unfulfilled.
///
/// # Errors
///
/// Propagates the first upstream failure; the fallback is not attempted
/// after an error.
#[instrument(skip(client, urls))]
pub async fn fetch_pending_orders(
    client: &AdminClient,
    urls: &StoreUrls,
) -> Result<Vec<NormalizedOrder>, ShopifyError> {
    let unfulfilled =
        OrderQuery::new(PENDING_LIMIT).fulfillment_status(FulfillmentFilter::Unfulfilled);
    let mut orders = client.list_orders(&unfulfilled).await?;

    if orders.is_empty() {
        tracing::info!("No unfulfilled orders, falling back to recent orders");
        orders = client.list_orders(&OrderQuery::new(PENDING_LIMIT)).await?;
    }

    sort_newest_first(&mut orders);
    orders.truncate(PENDING_LIMIT as usize);

    let normalized = normalize_orders(&orders, urls);
    tracing::info!(count = normalized.len(), "Pending orders");
    Ok(normalized)
}

/// Fetch one page of orders matching `query`, newest first.
///
/// # Errors
///
/// Propagates the upstream failure.
#[instrument(skip(client, urls))]
pub async fn fetch_orders(
    client: &AdminClient,
    urls: &StoreUrls,
    query: &OrderQuery,
) -> Result<Vec<NormalizedOrder>, ShopifyError> {
    let mut orders = client.list_orders(query).await?;
    sort_newest_first(&mut orders);
    Ok(normalize_orders(&orders, urls))
}

/// Keep orders created within `start..=end`. Orders without a timestamp are
/// dropped.
pub fn retain_created_between(
    orders: &mut Vec<Order>,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) {
    orders.retain(|order| {
        order
            .created_at
            .is_some_and(|created| created >= start && created <= end)
    });
}

/// Orders created between `start` and `end`, newest first.
///
/// Shopify filters on `created_at_min`; the upper bound is applied here.
///
/// # Errors
///
/// Propagates the upstream failure.
#[instrument(skip(client, urls, query))]
pub async fn fetch_orders_in_range(
    client: &AdminClient,
    urls: &StoreUrls,
    query: OrderQuery,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Result<Vec<NormalizedOrder>, ShopifyError> {
    let mut orders = client.list_orders(&query.created_at_min(start)).await?;
    retain_created_between(&mut orders, start, end);
    sort_newest_first(&mut orders);

    let normalized = normalize_orders(&orders, urls);
    tracing::info!(count = normalized.len(), %start, %end, "Orders in date range");
    Ok(normalized)
}
