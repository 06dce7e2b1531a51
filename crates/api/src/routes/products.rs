//! Product catalog and product analytics endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use storelens_core::ProductId;

use super::{Envelope, params};
use crate::analytics::products::{
    self, DEFAULT_LIMIT, DEFAULT_LOW_STOCK_THRESHOLD, LowStockEntry, ProductSales,
};
use crate::error::AppError;
use crate::shopify::{Product, ShopifyError};
use crate::state::AppState;

const MAX_PAGE: u32 = 250;
const MAX_RANKED: usize = 50;
const MAX_THRESHOLD: i64 = 100;
const MAX_LOW_STOCK: usize = 250;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list))
        .route("/api/products/low-stock", get(low_stock))
        .route("/api/products/best-selling", get(best_selling))
        .route("/api/products/worst-selling", get(worst_selling))
        .route("/api/products/{id}", get(show))
        .route("/api/best-selling", get(legacy_best_selling))
        .route("/api/worst-selling", get(legacy_worst_selling))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankedQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<String>,
    pub limit: Option<String>,
}

/// One page of the raw catalog with its cursor.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Product>>>, AppError> {
    let limit = params::bounded("limit", query.limit.as_deref(), MAX_PAGE, 1..=MAX_PAGE)?;
    let page_info = query.page_info.as_deref().filter(|s| !s.is_empty());

    let page = state.shopify().list_products(limit, page_info).await?;
    let pagination = json!({
        "hasNextPage": page.next_page_info.is_some(),
        "nextPageInfo": page.next_page_info,
    });

    Ok(Json(Envelope::list(page.products).with("pagination", pagination)))
}

async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<Envelope<Vec<LowStockEntry>>>, AppError> {
    let threshold = params::bounded(
        "threshold",
        query.threshold.as_deref(),
        DEFAULT_LOW_STOCK_THRESHOLD,
        1..=MAX_THRESHOLD,
    )?;
    let limit = params::bounded("limit", query.limit.as_deref(), DEFAULT_LIMIT, 1..=MAX_LOW_STOCK)?;

    let entries =
        products::fetch_low_stock(state.shopify(), state.urls(), threshold, limit).await?;
    Ok(Json(Envelope::list(entries).with("threshold", threshold)))
}

async fn best_selling(
    State(state): State<AppState>,
    Query(query): Query<RankedQuery>,
) -> Result<Json<Envelope<Vec<ProductSales>>>, AppError> {
    let limit = params::bounded("limit", query.limit.as_deref(), DEFAULT_LIMIT, 1..=MAX_RANKED)?;
    let rows = products::fetch_best_selling(state.shopify(), state.urls(), limit).await?;
    Ok(Json(Envelope::list(rows)))
}

async fn worst_selling(
    State(state): State<AppState>,
    Query(query): Query<RankedQuery>,
) -> Result<Json<Envelope<Vec<ProductSales>>>, AppError> {
    let limit = params::bounded("limit", query.limit.as_deref(), DEFAULT_LIMIT, 1..=MAX_RANKED)?;
    let rows = products::fetch_worst_selling(state.shopify(), state.urls(), limit).await?;
    Ok(Json(Envelope::list(rows)))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Product>>, AppError> {
    let id: ProductId = params::path_id("product", &id)?;
    let product = state.shopify().get_product(id).await.map_err(|e| match e {
        ShopifyError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
        other => AppError::Shopify(other),
    })?;
    Ok(Json(Envelope::new(product)))
}

/// 301 to `target`, keeping the caller's query string.
fn moved_permanently(target: &str, query: Option<String>) -> impl IntoResponse {
    let location = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{target}?{q}"),
        None => target.to_string(),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)])
}

async fn legacy_best_selling(RawQuery(query): RawQuery) -> impl IntoResponse {
    moved_permanently("/api/products/best-selling", query)
}

async fn legacy_worst_selling(RawQuery(query): RawQuery) -> impl IntoResponse {
    moved_permanently("/api/products/worst-selling", query)
}
