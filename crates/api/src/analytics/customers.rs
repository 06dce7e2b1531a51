//! Customer statistics over one page of customers.

use rust_decimal::Decimal;
use serde::Serialize;
use storelens_core::CustomerId;

use crate::shopify::Customer;

/// Customers listed in `top_customers`.
pub const TOP_CUSTOMERS: usize = 5;

/// Customers fetched for statistics (one page).
pub const STATS_PAGE: u32 = 250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total: usize,
    pub verified: usize,
    pub unverified: usize,
    pub total_spent: Decimal,
    pub total_orders: u64,
    /// `total_spent / total_orders`, zero when there are no orders.
    pub average_order_value: Decimal,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCustomer {
    pub id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub total_spent: Decimal,
    pub orders_count: u64,
}

#[must_use]
pub fn customer_stats(customers: &[Customer]) -> CustomerStats {
    let verified = customers
        .iter()
        .filter(|c| c.verified_email.unwrap_or(false))
        .count();
    let total_spent = customers
        .iter()
        .map(Customer::spent)
        .fold(Decimal::ZERO, |acc, spent| acc.checked_add(spent).unwrap_or(acc));
    let total_orders = customers
        .iter()
        .filter_map(|c| c.orders_count)
        .fold(0_u64, u64::saturating_add);
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        (total_spent / Decimal::from(total_orders)).round_dp(2)
    };

    let mut ranked: Vec<&Customer> = customers.iter().collect();
    ranked.sort_by(|a, b| b.spent().cmp(&a.spent()));
    let top_customers = ranked
        .into_iter()
        .take(TOP_CUSTOMERS)
        .map(|c| TopCustomer {
            id: c.id,
            name: c.full_name().unwrap_or_default(),
            email: c.email.clone(),
            total_spent: c.spent(),
            orders_count: c.orders_count.unwrap_or(0),
        })
        .collect();

    CustomerStats {
        total: customers.len(),
        verified,
        unverified: customers.len() - verified,
        total_spent,
        total_orders,
        average_order_value,
        top_customers,
    }
}
