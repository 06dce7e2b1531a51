//! Notifications derived from recent orders.
//!
//! Each recent order becomes one [`NotificationRecord`], classified by value
//! and payment/fulfillment state. Read and archived flags live in a
//! [`NotificationStore`] that is created empty at startup and never
//! persisted; an order with no stored entry is unread and unarchived.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use storelens_core::{DEFAULT_CURRENCY, FinancialStatus, FulfillmentStatus, OrderId};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::shopify::{AdminClient, Order, OrderQuery, ShopifyError, join_name};

use super::orders::GUEST_NAME;

/// Look-back window when the caller does not pass one.
pub const DEFAULT_HOURS: i64 = 24;

/// Notifications returned when the caller does not pass a limit.
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 50;

const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
const HIGH_PRIORITY_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

// =============================================================================
// Classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    HighValue,
    PendingFulfillment,
    PaymentPending,
    Refunded,
    NewOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Classify an order. Rules are checked in order; the first match wins.
///
/// A missing or malformed total counts as zero.
#[must_use]
pub fn classify(order: &Order) -> (NotificationType, Priority) {
    let total = order.total().unwrap_or_default();
    let awaits_fulfillment = order.awaits_fulfillment();

    let kind = if total > HIGH_VALUE_THRESHOLD {
        NotificationType::HighValue
    } else if awaits_fulfillment {
        NotificationType::PendingFulfillment
    } else {
        match order.financial_status {
            Some(FinancialStatus::Pending) => NotificationType::PaymentPending,
            Some(FinancialStatus::Refunded) => NotificationType::Refunded,
            _ => NotificationType::NewOrder,
        }
    };

    let priority = if total > HIGH_PRIORITY_THRESHOLD {
        Priority::High
    } else if total > HIGH_VALUE_THRESHOLD || awaits_fulfillment {
        Priority::Medium
    } else {
        Priority::Low
    };

    (kind, priority)
}

// =============================================================================
// Records
// =============================================================================

/// One notification, keyed by the order it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: OrderId,
    /// Display label, e.g. `#1001`.
    pub order_id: String,
    pub customer: String,
    pub order_value: f64,
    pub currency: String,
    pub status: String,
    pub financial_status: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub priority: Priority,
    pub read: bool,
    pub archived: bool,
}

/// Build a notification from an order, unread and unarchived.
///
/// Returns `None` for an order without an id. `now` stands in for a missing
/// creation time.
#[must_use]
pub fn format_notification(
    order: &Order,
    now: DateTime<FixedOffset>,
) -> Option<NotificationRecord> {
    let id = order.id?;
    let (kind, priority) = classify(order);

    let order_label = order
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| order.order_number.map(|number| format!("#{number}")))
        .unwrap_or_else(|| format!("#{id}"));
    let customer = order
        .customer
        .as_ref()
        .and_then(|c| join_name(c.first_name.as_deref(), c.last_name.as_deref()))
        .unwrap_or_else(|| GUEST_NAME.to_string());

    Some(NotificationRecord {
        id,
        order_id: order_label,
        customer,
        order_value: order.total().and_then(|t| t.to_f64()).unwrap_or(0.0),
        currency: order
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        status: order
            .fulfillment_status
            .map_or(FulfillmentStatus::Unfulfilled.as_str(), |s| s.as_str())
            .to_string(),
        financial_status: order
            .financial_status
            .map_or(FinancialStatus::Pending.as_str(), |s| s.as_str())
            .to_string(),
        created_at: order.created_at.unwrap_or(now),
        kind,
        priority,
        read: false,
        archived: false,
    })
}

// =============================================================================
// State store
// =============================================================================

/// Per-notification flags. The default is what an absent entry means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationState {
    pub read: bool,
    pub archived: bool,
}

/// Counts over stored notification states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    pub archived: usize,
    pub active: usize,
}

/// Process-lifetime read/archived state, shared across requests.
///
/// Entries are created on first mutation. Updates are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    states: Arc<RwLock<HashMap<OrderId, NotificationState>>>,
}

impl NotificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored state, or the default when none exists.
    pub async fn get(&self, id: OrderId) -> NotificationState {
        self.states.read().await.get(&id).copied().unwrap_or_default()
    }

    /// Mark one notification read. Idempotent.
    pub async fn mark_read(&self, id: OrderId) -> NotificationState {
        let mut states = self.states.write().await;
        let state = states.entry(id).or_default();
        state.read = true;
        *state
    }

    /// Archive one notification. Idempotent.
    pub async fn archive(&self, id: OrderId) -> NotificationState {
        let mut states = self.states.write().await;
        let state = states.entry(id).or_default();
        state.archived = true;
        *state
    }

    /// Mark every stored, non-archived notification read.
    ///
    /// Only entries that already exist are touched. Returns how many
    /// non-archived entries were visited.
    pub async fn mark_all_read(&self) -> usize {
        let mut states = self.states.write().await;
        let mut marked = 0;
        for state in states.values_mut().filter(|s| !s.archived) {
            state.read = true;
            marked += 1;
        }
        marked
    }

    pub async fn stats(&self) -> NotificationStats {
        let states = self.states.read().await;
        let read = states.values().filter(|s| s.read).count();
        let archived = states.values().filter(|s| s.archived).count();

        NotificationStats {
            total: states.len(),
            read,
            unread: states.len() - read,
            archived,
            active: states.len() - archived,
        }
    }

    /// Overwrite `read`/`archived` on records that have stored state.
    pub async fn apply(&self, records: &mut [NotificationRecord]) {
        let states = self.states.read().await;
        for record in records {
            if let Some(state) = states.get(&record.id) {
                record.read = state.read;
                record.archived = state.archived;
            }
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Builds notification lists from recent orders and owns their state.
#[derive(Clone)]
pub struct NotificationService {
    client: AdminClient,
    store: NotificationStore,
}

impl NotificationService {
    #[must_use]
    pub const fn new(client: AdminClient, store: NotificationStore) -> Self {
        Self { client, store }
    }

    #[must_use]
    pub const fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Notifications for orders created in the last `hours`, newest first.
    ///
    /// Orders without an id are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Propagates the upstream failure.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        hours: i64,
        limit: u32,
    ) -> Result<Vec<NotificationRecord>, ShopifyError> {
        let now = Utc::now().fixed_offset();
        let query = OrderQuery::new(limit).created_at_min(now - Duration::hours(hours));
        let orders = self.client.list_orders(&query).await?;

        let mut records: Vec<NotificationRecord> = orders
            .iter()
            .filter_map(|order| {
                let record = format_notification(order, now);
                if record.is_none() {
                    tracing::warn!(name = ?order.name, "Skipping order without id");
                }
                record
            })
            .collect();

        self.store.apply(&mut records).await;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::info!(count = records.len(), hours, "Notifications");
        Ok(records)
    }

    pub async fn mark_read(&self, id: OrderId) -> NotificationState {
        self.store.mark_read(id).await
    }

    pub async fn archive(&self, id: OrderId) -> NotificationState {
        self.store.archive(id).await
    }

    pub async fn mark_all_read(&self) -> usize {
        self.store.mark_all_read().await
    }

    pub async fn stats(&self) -> NotificationStats {
        self.store.stats().await
    }
}
