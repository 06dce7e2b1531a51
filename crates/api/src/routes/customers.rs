//! Customer endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use storelens_core::CustomerId;

use super::{Envelope, params};
use crate::analytics::customers::{CustomerStats, STATS_PAGE, customer_stats};
use crate::error::AppError;
use crate::shopify::{Customer, ShopifyError};
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 250;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list))
        .route("/api/customers/stats", get(stats))
        .route("/api/customers/{id}", get(show))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Customer>>>, AppError> {
    let limit = params::bounded("limit", query.limit.as_deref(), DEFAULT_LIMIT, 1..=MAX_LIMIT)?;
    let customers = state.shopify().list_customers(limit).await?;
    Ok(Json(Envelope::list(customers)))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Envelope<CustomerStats>>, AppError> {
    let customers = state.shopify().list_customers(STATS_PAGE).await?;
    let stats = customer_stats(&customers);
    tracing::info!(total = stats.total, "Customer stats");
    Ok(Json(Envelope::new(stats)))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Customer>>, AppError> {
    let id: CustomerId = params::path_id("customer", &id)?;
    let customer = state.shopify().get_customer(id).await.map_err(|e| match e {
        ShopifyError::NotFound(_) => AppError::NotFound("Customer not found".to_string()),
        other => AppError::Shopify(other),
    })?;
    Ok(Json(Envelope::new(customer)))
}
