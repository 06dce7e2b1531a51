//! StoreLens API - backend-for-frontend for a Shopify analytics dashboard.
//!
//! Reads orders, products and customers from one store's Admin REST API and
//! serves derived views (best/worst sellers, low stock, pending orders,
//! notifications) as JSON.
//!
//! # Architecture
//!
//! - Axum web framework
//! - [`shopify::AdminClient`] for all upstream reads (no caching, no retries)
//! - [`analytics`] for the derived views, pure where possible
//! - In-memory notification read/archive state, lost on restart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod config;
pub mod error;
pub mod routes;
pub mod shopify;
pub mod state;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// CORS for the configured dashboard origins. Unparseable origins are
/// skipped with a warning.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// The full application: routes, request tracing, CORS and Sentry layers.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().allowed_origins);

    routes::routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
