//! Per-product sales totals over a window of orders.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use storelens_core::{ProductId, parse_amount};

use crate::shopify::Order;

/// Accumulated sales of one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub quantity: u64,
    pub revenue: Decimal,
    /// First currency seen for the product.
    pub currency: Option<String>,
}

/// Sum quantity and revenue per product across `orders`.
///
/// Line items without a product reference (deleted products) are skipped.
/// An unparseable unit price, or a line whose revenue would overflow,
/// contributes zero revenue but still counts toward quantity.
#[must_use]
pub fn aggregate_sales(orders: &[Order]) -> HashMap<ProductId, SalesRecord> {
    let mut sales: HashMap<ProductId, SalesRecord> = HashMap::new();

    for order in orders {
        for item in &order.line_items {
            let Some(product_id) = item.product_id else {
                continue;
            };
            let record = sales.entry(product_id).or_default();
            let unit_price = parse_amount(item.price.as_deref()).unwrap_or_default();
            let line_revenue = unit_price
                .checked_mul(Decimal::from(item.quantity))
                .unwrap_or_default();

            record.quantity = record.quantity.saturating_add(u64::from(item.quantity));
            if let Some(revenue) = record.revenue.checked_add(line_revenue) {
                record.revenue = revenue;
            }
            if record.currency.is_none() {
                record.currency.clone_from(&order.currency);
            }
        }
    }

    sales
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::LineItem;

    fn item(product: Option<i64>, quantity: u32, price: &str) -> LineItem {
        LineItem {
            product_id: product.map(ProductId::new),
            quantity,
            price: Some(price.to_string()),
            ..LineItem::default()
        }
    }

    fn order(items: Vec<LineItem>) -> Order {
        Order {
            currency: Some("EUR".to_string()),
            line_items: items,
            ..Order::default()
        }
    }

    #[test]
    fn test_sums_across_orders() {
        let orders = vec![
            order(vec![item(Some(1), 2, "10.00"), item(Some(2), 1, "5.50")]),
            order(vec![item(Some(1), 3, "10.00")]),
        ];

        let sales = aggregate_sales(&orders);

        let first = &sales[&ProductId::new(1)];
        assert_eq!(first.quantity, 5);
        assert_eq!(first.revenue, Decimal::new(5000, 2));
        assert_eq!(first.currency.as_deref(), Some("EUR"));
        assert_eq!(sales[&ProductId::new(2)].revenue, Decimal::new(550, 2));
    }

    #[test]
    fn test_skips_deleted_products() {
        let orders = vec![order(vec![item(None, 4, "1.00"), item(Some(3), 1, "2.00")])];

        let sales = aggregate_sales(&orders);

        assert_eq!(sales.len(), 1);
        assert!(sales.contains_key(&ProductId::new(3)));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_sales(&[]).is_empty());
        assert!(aggregate_sales(&[order(Vec::new())]).is_empty());
    }

    #[test]
    fn test_bad_price_counts_quantity_only() {
        let sales = aggregate_sales(&[order(vec![item(Some(9), 2, "free")])]);
        let record = &sales[&ProductId::new(9)];
        assert_eq!(record.quantity, 2);
        assert_eq!(record.revenue, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_revenue_counts_as_zero() {
        let max = Decimal::MAX.to_string();

        let sales = aggregate_sales(&[order(vec![item(Some(1), 2, &max)])]);
        let record = &sales[&ProductId::new(1)];
        assert_eq!(record.quantity, 2);
        assert_eq!(record.revenue, Decimal::ZERO);

        let sales = aggregate_sales(&[order(vec![
            item(Some(2), 1, &max),
            item(Some(2), 1, "1.00"),
        ])]);
        let record = &sales[&ProductId::new(2)];
        assert_eq!(record.quantity, 2);
        assert_eq!(record.revenue, Decimal::MAX);
    }

    #[test]
    fn test_order_independent() {
        let a = order(vec![item(Some(1), 1, "3.00")]);
        let b = order(vec![item(Some(1), 2, "3.00"), item(Some(2), 5, "1.00")]);

        let forward = aggregate_sales(&[a.clone(), b.clone()]);
        let reverse = aggregate_sales(&[b, a]);

        assert_eq!(forward, reverse);
    }
}
