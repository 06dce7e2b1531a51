//! Admin REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{LINK, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use storelens_core::{CustomerId, OrderId, ProductId};
use tracing::instrument;

use crate::config::{OAuthConfig, ShopifyConfig};

use super::pagination::next_page_info;
use super::types::{Customer, Order, OrderQuery, Product, Shop, ShopUser};
use super::ShopifyError;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("storelens-api/", env!("CARGO_PKG_VERSION"));

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// One page of products plus the cursor for the next one.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub next_page_info: Option<String>,
}

/// Token returned by the OAuth code exchange.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub scope: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Shopify Admin REST API client.
///
/// Cheap to clone; clones share one connection pool. Every call is a single
/// GET with no retries, bounded by the configured timeout.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    store: String,
    api_version: String,
    /// Replaces `https://{shop}` for every shop when set.
    base_url_override: Option<String>,
    access_token: SecretString,
}

// =============================================================================
// Wire envelopes
// =============================================================================

#[derive(Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Deserialize)]
struct CustomersEnvelope {
    #[serde(default)]
    customers: Vec<Customer>,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: Customer,
}

#[derive(Deserialize)]
struct ShopEnvelope {
    shop: Shop,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: ShopUser,
}

#[derive(Serialize)]
struct CodeExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct CodeExchangeResponse {
    access_token: String,
    #[serde(default)]
    scope: String,
}

impl AdminClient {
    /// Create a client for the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                http,
                store: config.store.clone(),
                api_version: config.api_version.clone(),
                base_url_override: config
                    .api_base_url
                    .as_ref()
                    .map(|base| base.trim_end_matches('/').to_string()),
                access_token: config.access_token.clone(),
            }),
        })
    }

    /// A client for another shop and token, sharing this connection pool.
    ///
    /// Used by the OAuth flow to act with a freshly issued token.
    #[must_use]
    pub fn for_shop(&self, shop: &str, access_token: SecretString) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                http: self.inner.http.clone(),
                store: shop.to_string(),
                api_version: self.inner.api_version.clone(),
                base_url_override: self.inner.base_url_override.clone(),
                access_token,
            }),
        }
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    fn shop_root(&self, shop: &str) -> String {
        self.inner
            .base_url_override
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"))
    }

    fn resource_url(&self, resource: &str, params: &[(&str, String)]) -> String {
        let url = format!(
            "{}/admin/api/{}/{resource}",
            self.shop_root(&self.inner.store),
            self.inner.api_version
        );
        if params.is_empty() {
            return url;
        }
        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{url}?{query}")
    }

    /// GET a resource and decode it, returning the `Link` header alongside.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<(T, Option<String>), ShopifyError> {
        let url = self.resource_url(resource, params);
        tracing::debug!(%url, "Shopify API request");

        let response = self
            .inner
            .http
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), %url, "Shopify API response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    // Retry-After is a small non-negative number of seconds
                    let secs = secs.ceil().max(0.0) as u64;
                    secs
                });
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::warn!(status = status.as_u16(), %url, "Shopify API error");
            return Err(ShopifyError::Upstream {
                status: status.as_u16(),
                details: parse_details(body),
            });
        }

        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;
        let parsed = serde_json::from_str::<T>(&body)?;

        Ok((parsed, link))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch one page of orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an order list.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ShopifyError> {
        let (envelope, _) = self
            .get_json::<OrdersEnvelope>("orders.json", &query.to_params())
            .await?;
        tracing::debug!(count = envelope.orders.len(), "Fetched orders");
        Ok(envelope.orders)
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] if the order does not exist.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ShopifyError> {
        let params = [("fields", super::types::ORDER_FIELDS.join(","))];
        let (envelope, _) = self
            .get_json::<OrderEnvelope>(&format!("orders/{id}.json"), &params)
            .await?;
        Ok(envelope.order)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch one page of products, following `page_info` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn list_products(
        &self,
        limit: u32,
        page_info: Option<&str>,
    ) -> Result<ProductPage, ShopifyError> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(cursor) = page_info {
            params.push(("page_info", cursor.to_string()));
        }

        let (envelope, link) = self
            .get_json::<ProductsEnvelope>("products.json", &params)
            .await?;
        tracing::debug!(count = envelope.products.len(), "Fetched products");

        Ok(ProductPage {
            products: envelope.products,
            next_page_info: next_page_info(link.as_deref()),
        })
    }

    /// Fetch specific products by ID. Returns an empty list for no IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self, ids), fields(store = %self.inner.store, count = ids.len()))]
    pub async fn get_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, ShopifyError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = [("ids", joined), ("limit", ids.len().min(250).to_string())];

        let (envelope, _) = self
            .get_json::<ProductsEnvelope>("products.json", &params)
            .await?;
        Ok(envelope.products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ShopifyError> {
        let (envelope, _) = self
            .get_json::<ProductEnvelope>(&format!("products/{id}.json"), &[])
            .await?;
        Ok(envelope.product)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Fetch one page of customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a customer list.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn list_customers(&self, limit: u32) -> Result<Vec<Customer>, ShopifyError> {
        let (envelope, _) = self
            .get_json::<CustomersEnvelope>("customers.json", &[("limit", limit.to_string())])
            .await?;
        tracing::debug!(count = envelope.customers.len(), "Fetched customers");
        Ok(envelope.customers)
    }

    /// Fetch a single customer.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] if the customer does not exist.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ShopifyError> {
        let (envelope, _) = self
            .get_json::<CustomerEnvelope>(&format!("customers/{id}.json"), &[])
            .await?;
        Ok(envelope.customer)
    }

    // =========================================================================
    // Shop & OAuth
    // =========================================================================

    /// Fetch the shop record for this client's token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn get_shop(&self) -> Result<Shop, ShopifyError> {
        let (envelope, _) = self.get_json::<ShopEnvelope>("shop.json", &[]).await?;
        Ok(envelope.shop)
    }

    /// Fetch the staff user that owns this client's token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn get_current_user(&self) -> Result<ShopUser, ShopifyError> {
        let (envelope, _) = self
            .get_json::<UserEnvelope>("users/current.json", &[])
            .await?;
        Ok(envelope.user)
    }

    /// Exchange an OAuth authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Upstream`] if Shopify rejects the code.
    #[instrument(skip(self, oauth, code))]
    pub async fn exchange_code(
        &self,
        shop: &str,
        oauth: &OAuthConfig,
        code: &str,
    ) -> Result<AccessToken, ShopifyError> {
        let url = format!("{}/admin/oauth/access_token", self.shop_root(shop));
        let response = self
            .inner
            .http
            .post(&url)
            .json(&CodeExchangeRequest {
                client_id: &oauth.api_key,
                client_secret: oauth.api_secret.expose_secret(),
                code,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), shop, "OAuth code exchange rejected");
            return Err(ShopifyError::Upstream {
                status: status.as_u16(),
                details: parse_details(body),
            });
        }

        let token: CodeExchangeResponse = serde_json::from_str(&body)?;
        tracing::info!(shop, scope = %token.scope, "OAuth code exchanged");

        Ok(AccessToken {
            access_token: SecretString::from(token.access_token),
            scope: token.scope,
        })
    }
}

/// Error body as JSON when it parses, else verbatim.
fn parse_details(body: String) -> serde_json::Value {
    serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
}
