//! Notification feed and read/archive state.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::Deserialize;
use storelens_core::OrderId;

use super::{Envelope, params};
use crate::analytics::notifications::{
    DEFAULT_HOURS, DEFAULT_NOTIFICATION_LIMIT, NotificationRecord, NotificationState,
    NotificationStats,
};
use crate::error::AppError;
use crate::state::AppState;

const MAX_HOURS: i64 = 168;
const MAX_LIMIT: u32 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list))
        .route("/api/notifications/stats", get(stats))
        .route("/api/notifications/mark-all-read", patch(mark_all_read))
        .route("/api/notifications/{id}/read", patch(mark_read))
        .route("/api/notifications/{id}/archive", patch(archive))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub hours: Option<String>,
    pub limit: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<NotificationRecord>>>, AppError> {
    let hours = params::bounded("hours", query.hours.as_deref(), DEFAULT_HOURS, 1..=MAX_HOURS)?;
    let limit = params::bounded(
        "limit",
        query.limit.as_deref(),
        DEFAULT_NOTIFICATION_LIMIT,
        1..=MAX_LIMIT,
    )?;

    let records = state.notifications().list(hours, limit).await?;
    Ok(Json(
        Envelope::list(records).with("timeRange", format!("{hours} hours")),
    ))
}

async fn stats(State(state): State<AppState>) -> Json<Envelope<NotificationStats>> {
    Json(Envelope::new(state.notifications().stats().await))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<NotificationState>>, AppError> {
    let id: OrderId = params::path_id("notification", &id)?;
    let updated = state.notifications().mark_read(id).await;
    tracing::debug!(%id, "Notification marked read");

    Ok(Json(
        Envelope::new(updated)
            .with("message", "Notification marked as read")
            .with("notificationId", id.as_i64()),
    ))
}

async fn archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<NotificationState>>, AppError> {
    let id: OrderId = params::path_id("notification", &id)?;
    let updated = state.notifications().archive(id).await;
    tracing::debug!(%id, "Notification archived");

    Ok(Json(
        Envelope::new(updated)
            .with("message", "Notification archived")
            .with("notificationId", id.as_i64()),
    ))
}

async fn mark_all_read(State(state): State<AppState>) -> Json<Envelope<usize>> {
    let count = state.notifications().mark_all_read().await;
    tracing::info!(count, "All notifications marked read");

    let envelope = Envelope {
        count: Some(count),
        ..Envelope::new(count)
    };
    Json(envelope.with("message", format!("{count} notifications marked as read")))
}
