//! Order endpoints. Every order leaves here normalized.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use storelens_core::OrderId;

use super::Envelope;
use super::params::{self, DayBound};
use crate::analytics::orders::{self, NormalizedOrder, normalize_order};
use crate::error::AppError;
use crate::shopify::{FulfillmentFilter, OrderQuery, OrderStatusFilter, ShopifyError};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u32 = 50;
const DEFAULT_RANGE_LIMIT: u32 = 250;
const MAX_LIMIT: u32 = 250;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list))
        .route("/api/orders/pending", get(pending))
        .route("/api/orders/date-range", get(date_range))
        .route("/api/orders/{id}", get(show))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub status: Option<String>,
    pub fulfillment_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<NormalizedOrder>>>, AppError> {
    let limit =
        params::bounded("limit", query.limit.as_deref(), DEFAULT_LIST_LIMIT, 1..=MAX_LIMIT)?;
    let status: Option<OrderStatusFilter> = params::optional(query.status.as_deref())?;
    let fulfillment: Option<FulfillmentFilter> =
        params::optional(query.fulfillment_status.as_deref())?;

    let mut order_query = OrderQuery::new(limit).status(status.unwrap_or_default());
    if let Some(fulfillment) = fulfillment {
        order_query = order_query.fulfillment_status(fulfillment);
    }

    let rows = orders::fetch_orders(state.shopify(), state.urls(), &order_query).await?;
    Ok(Json(Envelope::list(rows)))
}

async fn pending(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<NormalizedOrder>>>, AppError> {
    let rows = orders::fetch_pending_orders(state.shopify(), state.urls()).await?;
    Ok(Json(Envelope::list(rows)))
}

async fn date_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<NormalizedOrder>>>, AppError> {
    let start = params::date("start_date", query.start_date.as_deref(), DayBound::Start)?;
    let end = params::date("end_date", query.end_date.as_deref(), DayBound::End)?;
    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    let limit =
        params::bounded("limit", query.limit.as_deref(), DEFAULT_RANGE_LIMIT, 1..=MAX_LIMIT)?;
    let status: Option<OrderStatusFilter> = params::optional(query.status.as_deref())?;

    let order_query = OrderQuery::new(limit).status(status.unwrap_or_default());
    let rows =
        orders::fetch_orders_in_range(state.shopify(), state.urls(), order_query, start, end)
            .await?;

    Ok(Json(Envelope::list(rows).with(
        "dateRange",
        json!({ "start": start.to_rfc3339(), "end": end.to_rfc3339() }),
    )))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<NormalizedOrder>>, AppError> {
    let id: OrderId = params::path_id("order", &id)?;
    let order = state.shopify().get_order(id).await.map_err(|e| match e {
        ShopifyError::NotFound(_) => AppError::NotFound("Order not found".to_string()),
        other => AppError::Shopify(other),
    })?;

    let normalized = normalize_order(&order, state.urls())
        .ok_or_else(|| AppError::Internal(format!("order {id} returned without an id")))?;
    Ok(Json(Envelope::new(normalized)))
}
