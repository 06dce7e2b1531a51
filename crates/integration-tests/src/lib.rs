//! Test harness for driving the StoreLens router against a mock Shopify.
//!
//! Each [`TestContext`] owns a fresh `wiremock` server standing in for the
//! store's Admin API and an application router pointed at it. Requests go
//! through the full middleware stack via `tower::ServiceExt::oneshot`, so no
//! port is bound for the API itself.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storelens-integration-tests
//! ```

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use storelens_api::config::{ApiConfig, OAuthConfig, ShopifyConfig};
use storelens_api::state::AppState;
use tower::ServiceExt;
use wiremock::MockServer;

pub const STORE: &str = "demo.myshopify.com";
pub const STOREFRONT: &str = "shop.example.com";
pub const API_VERSION: &str = "2024-01";
pub const ADMIN_TOKEN: &str = "shpat_k3Yx9QmL2vTz8RwB5nHd";

/// Path of an Admin REST resource on the mock server.
#[must_use]
pub fn admin_path(resource: &str) -> String {
    format!("/admin/api/{API_VERSION}/{resource}")
}

/// Configuration pointing every Shopify call at `base_url`.
#[must_use]
pub fn test_config(base_url: &str, oauth: Option<OAuthConfig>) -> ApiConfig {
    ApiConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        shopify: ShopifyConfig {
            store: STORE.to_string(),
            storefront_domain: STOREFRONT.to_string(),
            api_version: API_VERSION.to_string(),
            access_token: SecretString::from(ADMIN_TOKEN),
            api_base_url: Some(base_url.to_string()),
            timeout: Duration::from_secs(5),
        },
        oauth,
        frontend_url: Some("https://dash.example.com".to_string()),
        allowed_origins: vec!["https://dash.example.com".to_string()],
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// OAuth credentials for tests that exercise the auth routes.
#[must_use]
pub fn test_oauth() -> OAuthConfig {
    OAuthConfig {
        api_key: "test-client-id".to_string(),
        api_secret: SecretString::from("Vq7rN2xLp9KcW4tZ8mBj"),
    }
}

/// A decoded response: JSON bodies are parsed, text becomes a string,
/// empty bodies become `null`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestContext {
    pub shopify: MockServer,
    pub app: Router,
}

impl TestContext {
    /// Router with OAuth disabled.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Router with OAuth credentials configured.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    pub async fn with_oauth() -> Self {
        Self::build(Some(test_oauth())).await
    }

    #[allow(clippy::expect_used)]
    async fn build(oauth: Option<OAuthConfig>) -> Self {
        let shopify = MockServer::start().await;
        let state = AppState::new(test_config(&shopify.uri(), oauth))
            .expect("application state should build");
        Self {
            shopify,
            app: storelens_api::app(state),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn patch(&self, uri: &str) -> TestResponse {
        self.send(Method::PATCH, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Send one request through the full middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, method: Method, uri: &str, body: Option<&Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, "localhost:3001");
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
