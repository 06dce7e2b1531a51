//! Best-selling, worst-selling and low-stock product views.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use storelens_core::{DEFAULT_CURRENCY, ProductId, VariantId};
use tracing::instrument;

use super::StoreUrls;
use super::sales::{SalesRecord, aggregate_sales};
use crate::shopify::{AdminClient, OrderQuery, Product, ShopifyError};

/// Rows returned when the caller does not pass a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Inventory at or below this is low stock unless the caller says otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Orders scanned to build the sales index (one page).
pub const SALES_WINDOW: u32 = 250;

/// Products fetched for catalog-wide views (one page).
pub const CATALOG_PAGE: u32 = 250;

/// Most IDs Shopify accepts in one `products.json?ids=` lookup.
const MAX_ID_LOOKUP: usize = 250;

// =============================================================================
// Output rows
// =============================================================================

/// A product with its sales over the recent order window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub id: ProductId,
    pub product_id: ProductId,
    pub name: String,
    pub handle: Option<String>,
    pub image: Option<String>,
    pub total_sold: u64,
    pub revenue: Decimal,
    pub currency: String,
    pub admin_url: String,
    pub public_url: Option<String>,
}

/// A product with at least one low-stock variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockEntry {
    pub id: ProductId,
    pub product_id: ProductId,
    /// Tracked variant holding the minimum stock.
    pub variant_id: VariantId,
    pub name: String,
    /// Minimum inventory across the product's tracked variants.
    pub stock: i64,
    /// Variants within the threshold.
    pub low_variants: usize,
    pub image: Option<String>,
    pub handle: Option<String>,
    pub admin_url: String,
    pub public_url: Option<String>,
}

// =============================================================================
// Pure views
// =============================================================================

fn with_sales(
    products: &[Product],
    sales: &HashMap<ProductId, SalesRecord>,
    urls: &StoreUrls,
) -> Vec<ProductSales> {
    products
        .iter()
        .map(|product| {
            let record = sales.get(&product.id);
            ProductSales {
                id: product.id,
                product_id: product.id,
                name: product.title.clone(),
                handle: product.handle.clone(),
                image: product.image_src().map(ToString::to_string),
                total_sold: record.map_or(0, |r| r.quantity),
                revenue: record.map_or(Decimal::ZERO, |r| r.revenue),
                currency: record
                    .and_then(|r| r.currency.clone())
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                admin_url: urls.admin_product(product.id),
                public_url: urls.public_product(product.handle.as_deref()),
            }
        })
        .collect()
}

/// Products by units sold, highest first.
///
/// Products with no sales are included. Ties keep catalog order.
#[must_use]
pub fn best_selling(
    products: &[Product],
    sales: &HashMap<ProductId, SalesRecord>,
    limit: usize,
    urls: &StoreUrls,
) -> Vec<ProductSales> {
    let mut rows = with_sales(products, sales, urls);
    rows.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    rows.truncate(limit);
    rows
}

/// Products by units sold, lowest first. Unsold products lead.
#[must_use]
pub fn worst_selling(
    products: &[Product],
    sales: &HashMap<ProductId, SalesRecord>,
    limit: usize,
    urls: &StoreUrls,
) -> Vec<ProductSales> {
    let mut rows = with_sales(products, sales, urls);
    rows.sort_by_key(|row| row.total_sold);
    rows.truncate(limit);
    rows
}

/// Products with a tracked variant in `0..=threshold`, lowest stock first.
///
/// Untracked variants (`-1`) never qualify and never count toward `stock`.
#[must_use]
pub fn low_stock(
    products: &[Product],
    threshold: i64,
    limit: usize,
    urls: &StoreUrls,
) -> Vec<LowStockEntry> {
    let mut entries: Vec<LowStockEntry> = products
        .iter()
        .filter_map(|product| {
            let low_variants = product
                .variants
                .iter()
                .filter(|v| v.inventory().is_low(threshold))
                .count();
            if low_variants == 0 {
                return None;
            }

            let (stock, variant_id) = product
                .variants
                .iter()
                .filter_map(|v| v.inventory().tracked().map(|q| (q, v.id)))
                .min_by_key(|(q, _)| *q)?;

            Some(LowStockEntry {
                id: product.id,
                product_id: product.id,
                variant_id,
                name: product.title.clone(),
                stock,
                low_variants,
                image: product.image_src().map(ToString::to_string),
                handle: product.handle.clone(),
                admin_url: urls.admin_product(product.id),
                public_url: urls.public_product(product.handle.as_deref()),
            })
        })
        .collect();

    entries.sort_by_key(|entry| entry.stock);
    entries.truncate(limit);
    entries
}

// =============================================================================
// Fetching views
// =============================================================================

/// Sold products absent from `products`, best sellers first, at most `max`.
/// Ties break on id so the lookup is deterministic.
fn unlisted_sellers(
    products: &[Product],
    sales: &HashMap<ProductId, SalesRecord>,
    max: usize,
) -> Vec<ProductId> {
    let listed: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
    let mut missing: Vec<(ProductId, u64)> = sales
        .iter()
        .filter(|(id, _)| !listed.contains(id))
        .map(|(id, record)| (*id, record.quantity))
        .collect();
    missing.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    missing.truncate(max);
    missing.into_iter().map(|(id, _)| id).collect()
}

/// Catalog page plus sales index, with sold products missing from the page
/// looked up by ID.
async fn sales_inputs(
    client: &AdminClient,
) -> Result<(Vec<Product>, HashMap<ProductId, SalesRecord>), ShopifyError> {
    let orders = client.list_orders(&OrderQuery::new(SALES_WINDOW)).await?;
    let sales = aggregate_sales(&orders);
    let mut products = client.list_products(CATALOG_PAGE, None).await?.products;

    let missing = unlisted_sellers(&products, &sales, MAX_ID_LOOKUP);
    if !missing.is_empty() {
        tracing::debug!(count = missing.len(), "Looking up sold products outside catalog page");
        products.extend(client.get_products_by_ids(&missing).await?);
    }

    Ok((products, sales))
}

/// Fetch and build the best-selling view.
///
/// # Errors
///
/// Propagates the first upstream failure.
#[instrument(skip(client, urls))]
pub async fn fetch_best_selling(
    client: &AdminClient,
    urls: &StoreUrls,
    limit: usize,
) -> Result<Vec<ProductSales>, ShopifyError> {
    let (products, sales) = sales_inputs(client).await?;
    let rows = best_selling(&products, &sales, limit, urls);
    tracing::info!(count = rows.len(), "Best selling products");
    Ok(rows)
}

/// Fetch and build the worst-selling view.
///
/// # Errors
///
/// Propagates the first upstream failure.
#[instrument(skip(client, urls))]
pub async fn fetch_worst_selling(
    client: &AdminClient,
    urls: &StoreUrls,
    limit: usize,
) -> Result<Vec<ProductSales>, ShopifyError> {
    let (products, sales) = sales_inputs(client).await?;
    let rows = worst_selling(&products, &sales, limit, urls);
    tracing::info!(count = rows.len(), "Worst selling products");
    Ok(rows)
}

/// Fetch and build the low-stock view.
///
/// # Errors
///
/// Propagates the upstream failure.
#[instrument(skip(client, urls))]
pub async fn fetch_low_stock(
    client: &AdminClient,
    urls: &StoreUrls,
    threshold: i64,
    limit: usize,
) -> Result<Vec<LowStockEntry>, ShopifyError> {
    let page = client.list_products(CATALOG_PAGE, None).await?;
    let entries = low_stock(&page.products, threshold, limit, urls);
    tracing::info!(count = entries.len(), threshold, "Low stock products");
    Ok(entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::Variant;

    fn urls() -> StoreUrls {
        StoreUrls::new("demo.myshopify.com", "demo.myshopify.com")
    }

    fn variant(id: i64, inventory: Option<i64>) -> Variant {
        Variant {
            id: VariantId::new(id),
            product_id: None,
            title: None,
            price: Some("10.00".to_string()),
            sku: None,
            position: None,
            inventory_quantity: inventory,
        }
    }

    fn product(id: i64, variants: Vec<Variant>) -> Product {
        serde_json::from_value::<Product>(serde_json::json!({
            "id": id,
            "title": format!("Product {id}"),
            "handle": format!("product-{id}"),
        }))
        .map(|mut p| {
            p.variants = variants;
            p
        })
        .unwrap()
    }

    fn sold(entries: &[(i64, u64)]) -> HashMap<ProductId, SalesRecord> {
        entries
            .iter()
            .map(|&(id, quantity)| {
                (
                    ProductId::new(id),
                    SalesRecord {
                        quantity,
                        revenue: Decimal::from(quantity),
                        currency: None,
                    },
                )
            })
            .collect()
    }

    fn ids<T>(rows: &[T], id: impl Fn(&T) -> ProductId) -> Vec<i64> {
        rows.iter().map(|r| id(r).as_i64()).collect()
    }

    #[test]
    fn test_best_selling_sorted_and_includes_unsold() {
        let products: Vec<Product> = (1..=4).map(|id| product(id, Vec::new())).collect();
        let sales = sold(&[(2, 5), (3, 9)]);

        let rows = best_selling(&products, &sales, 10, &urls());

        assert_eq!(ids(&rows, |r| r.id), vec![3, 2, 1, 4]);
        assert!(rows.windows(2).all(|w| w[0].total_sold >= w[1].total_sold));
        assert_eq!(rows[3].total_sold, 0);
        assert_eq!(rows[3].currency, "USD");
    }

    #[test]
    fn test_unlisted_sellers_keeps_top_sellers_when_capped() {
        let listed = vec![product(1, Vec::new())];
        let sales = sold(&[(1, 100), (2, 1), (3, 50), (4, 7), (5, 50)]);

        let missing = unlisted_sellers(&listed, &sales, 3);

        assert_eq!(
            missing,
            vec![ProductId::new(3), ProductId::new(5), ProductId::new(4)]
        );
    }

    #[test]
    fn test_best_selling_respects_limit() {
        let products: Vec<Product> = (1..=5).map(|id| product(id, Vec::new())).collect();
        let rows = best_selling(&products, &sold(&[(5, 1)]), 2, &urls());
        assert_eq!(ids(&rows, |r| r.id), vec![5, 1]);
    }

    #[test]
    fn test_worst_selling_unsold_first() {
        let products: Vec<Product> = (1..=3).map(|id| product(id, Vec::new())).collect();
        let sales = sold(&[(1, 4), (2, 1)]);

        let rows = worst_selling(&products, &sales, 10, &urls());

        assert_eq!(ids(&rows, |r| r.id), vec![3, 2, 1]);
        assert!(rows.windows(2).all(|w| w[0].total_sold <= w[1].total_sold));
    }

    #[test]
    fn test_rows_carry_links() {
        let rows = best_selling(&[product(8, Vec::new())], &HashMap::new(), 1, &urls());
        assert_eq!(rows[0].admin_url, "https://demo.myshopify.com/admin/products/8");
        assert_eq!(
            rows[0].public_url.as_deref(),
            Some("https://demo.myshopify.com/products/product-8")
        );
    }

    #[test]
    fn test_low_stock_ignores_untracked() {
        let products = vec![
            product(1, vec![variant(11, Some(-1))]),
            product(2, vec![variant(21, None)]),
            product(3, vec![variant(31, Some(2))]),
        ];

        for threshold in [0, 5, 100] {
            let entries = low_stock(&products, threshold, 10, &urls());
            assert!(entries.iter().all(|e| e.id != ProductId::new(1)));
            assert!(entries.iter().all(|e| e.id != ProductId::new(2)));
        }
        assert_eq!(ids(&low_stock(&products, 5, 10, &urls()), |e| e.id), vec![3]);
    }

    #[test]
    fn test_low_stock_reports_min_tracked_variant() {
        let products = vec![product(
            1,
            vec![variant(11, Some(4)), variant(12, Some(-1)), variant(13, Some(1))],
        )];

        let entries = low_stock(&products, 5, 10, &urls());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stock, 1);
        assert_eq!(entries[0].variant_id, VariantId::new(13));
        assert_eq!(entries[0].low_variants, 2);
    }

    #[test]
    fn test_low_stock_zero_is_low() {
        let entries = low_stock(&[product(1, vec![variant(11, Some(0))])], 5, 10, &urls());
        assert_eq!(entries[0].stock, 0);
    }

    #[test]
    fn test_low_stock_oversold_counts_toward_min_only() {
        let products = vec![
            product(1, vec![variant(11, Some(-3))]),
            product(2, vec![variant(21, Some(-3)), variant(22, Some(4))]),
        ];

        let entries = low_stock(&products, 5, 10, &urls());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, ProductId::new(2));
        assert_eq!(entries[0].stock, -3);
    }

    #[test]
    fn test_low_stock_sorted_and_limited() {
        let products = vec![
            product(1, vec![variant(11, Some(5))]),
            product(2, vec![variant(21, Some(0))]),
            product(3, vec![variant(31, Some(3))]),
            product(4, vec![variant(41, Some(9))]),
        ];

        let entries = low_stock(&products, 5, 2, &urls());

        assert_eq!(ids(&entries, |e| e.id), vec![2, 3]);
    }
}
