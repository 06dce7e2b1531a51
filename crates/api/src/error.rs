//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API call failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Caller input rejected before any upstream call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A feature is used without the configuration it needs.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Upstream 4xx/5xx statuses pass through; a Shopify failure without a
    /// usable status is a bad gateway.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Shopify(err) => err
                .status()
                .filter(|status| (400..=599).contains(status))
                .and_then(|status| StatusCode::from_u16(status).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Shopify(ShopifyError::NotFound(_)) => "Resource not found".to_string(),
            Self::Shopify(_) => "Shopify API error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Config(msg) => msg.clone(),
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::Shopify(err) => err.details(),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "API request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "API request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.message(),
            "details": self.details(),
        });

        (status, Json(body)).into_response()
    }
}
