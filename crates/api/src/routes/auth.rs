//! Shopify OAuth endpoints.
//!
//! Tokens issued here are handed back to the caller and never stored.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    routing::{get, post},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;
use crate::error::AppError;
use crate::shopify::{Shop, ShopUser};
use crate::state::AppState;

/// Scopes requested by the authorize URL.
pub const SCOPES: &str = "read_products,read_orders,read_customers,read_analytics";

const SHOP_SUFFIX: &str = ".myshopify.com";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/shopify-login", get(login))
        .route("/api/auth/callback", post(callback))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/verify", get(verify))
}

fn oauth(state: &AppState) -> Result<&OAuthConfig, AppError> {
    state
        .config()
        .oauth()
        .ok_or_else(|| AppError::Config("Shopify OAuth is not configured".to_string()))
}

fn require<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// A bare `{name}.myshopify.com` host. The name is one DNS label of ASCII
/// letters, digits and hyphens, starting with a letter or digit, so nothing in
/// the value can move the URL authority elsewhere.
fn is_shop_domain(shop: &str) -> bool {
    let Some(name) = shop.strip_suffix(SHOP_SUFFIX) else {
        return false;
    };
    let mut bytes = name.bytes();
    bytes.next().is_some_and(|first| first.is_ascii_alphanumeric())
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn require_shop_domain(shop: &str) -> Result<(), AppError> {
    if is_shop_domain(shop) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid shop domain: expected {{name}}{SHOP_SUFFIX}"
        )))
    }
}

/// Shopify authorize URL for `shop`.
#[must_use]
pub fn authorize_url(shop: &str, api_key: &str, redirect_uri: &str) -> String {
    format!(
        "https://{shop}/admin/oauth/authorize?client_id={}&scope={SCOPES}&redirect_uri={}",
        urlencoding::encode(api_key),
        urlencoding::encode(redirect_uri),
    )
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub shop: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub auth_url: String,
}

/// The OAuth callback lands on the dashboard when `FRONTEND_URL` is set,
/// otherwise on the host the request came in on.
fn redirect_uri(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(frontend) = state.config().frontend_url.as_deref() {
        return Ok(format!("{}/auth/callback", frontend.trim_end_matches('/')));
    }

    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|host| format!("http://{host}/auth/callback"))
        .ok_or_else(|| AppError::Config("FRONTEND_URL is not set".to_string()))
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Result<Json<LoginResponse>, AppError> {
    let oauth = oauth(&state)?;
    let shop = match query.shop.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(shop) => {
            require_shop_domain(shop)?;
            shop.to_string()
        }
        None => state.config().shopify.store.clone(),
    };
    let redirect = redirect_uri(&state, &headers)?;

    Ok(Json(LoginResponse {
        success: true,
        auth_url: authorize_url(&shop, &oauth.api_key, &redirect),
    }))
}

// =============================================================================
// Callback
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CallbackRequest {
    pub code: Option<String>,
    pub shop: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub access_token: String,
    pub scope: String,
    pub shop: Shop,
    pub user: Option<ShopUser>,
}

async fn callback(
    State(state): State<AppState>,
    Json(body): Json<CallbackRequest>,
) -> Result<Json<CallbackResponse>, AppError> {
    let (Some(code), Some(shop)) = (
        body.code.as_deref().filter(|c| !c.is_empty()),
        body.shop.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Missing required parameters: code and shop".to_string(),
        ));
    };
    require_shop_domain(shop)?;
    let oauth = oauth(&state)?;

    let token = state.shopify().exchange_code(shop, oauth, code).await?;
    let client = state.shopify().for_shop(shop, token.access_token.clone());

    let shop_record = client.get_shop().await?;
    // Offline tokens have no associated staff user.
    let user = match client.get_current_user().await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(shop, error = %e, "Could not fetch current user");
            None
        }
    };

    tracing::info!(shop, "OAuth callback completed");
    Ok(Json(CallbackResponse {
        success: true,
        access_token: token.access_token.expose_secret().to_string(),
        scope: token.scope,
        shop: shop_record,
        user,
    }))
}

// =============================================================================
// Logout / verify
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        success: true,
        message: "Logged out successfully",
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub shop: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub shop: Shop,
}

/// Check a token by reading the shop record with it.
///
/// Rejections (401/403/404) become 401; transport failures keep their own
/// status.
async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyResponse>, AppError> {
    let shop = require(query.shop.as_deref(), "Missing shop or access_token")?;
    let token = require(query.access_token.as_deref(), "Missing shop or access_token")?;
    require_shop_domain(shop)?;

    let client = state
        .shopify()
        .for_shop(shop, SecretString::from(token.to_string()));
    match client.get_shop().await {
        Ok(shop) => Ok(Json(VerifyResponse { valid: true, shop })),
        Err(e) if matches!(e.status(), Some(401 | 403 | 404)) => {
            tracing::warn!(shop, "Access token rejected");
            Err(AppError::Unauthorized("Invalid access token".to_string()))
        }
        Err(e) => Err(AppError::Shopify(e)),
    }
}
