//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_API_TOKEN` - Shopify Admin API access token
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 3001)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SHOPIFY_STOREFRONT_DOMAIN` - Public domain for product/order links
//!   (default: the store domain)
//! - `SHOPIFY_API_BASE_URL` - Override for `https://{store}` (proxies, tests)
//! - `SHOPIFY_TIMEOUT_SECS` - Upstream request timeout (default: 30)
//! - `FRONTEND_URL` - Dashboard URL, used to build the OAuth redirect
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins
//!   (default: `http://localhost:3000,http://localhost:5173`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! ## Optional (OAuth - enables `/api/auth/*`)
//! - `SHOPIFY_API_KEY` - App client ID
//! - `SHOPIFY_API_SECRET` - App client secret

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_API_VERSION: &str = "2024-01";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "here",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// OAuth app credentials (optional - enables the auth routes)
    pub oauth: Option<OAuthConfig>,
    /// Dashboard URL (OAuth redirects land here)
    pub frontend_url: Option<String>,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Public storefront domain used for `public_url` links
    pub storefront_domain: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Base URL override; `None` means `https://{store}`
    pub api_base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("storefront_domain", &self.storefront_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ShopifyConfig {
    /// Root URL for the store, honoring the base URL override.
    #[must_use]
    pub fn store_base_url(&self) -> String {
        self.api_base_url.as_ref().map_or_else(
            || format!("https://{}", self.store),
            |base| base.trim_end_matches('/').to_string(),
        )
    }

    /// Root URL for the versioned Admin REST API.
    #[must_use]
    pub fn admin_api_url(&self) -> String {
        format!("{}/admin/api/{}", self.store_base_url(), self.api_version)
    }
}

/// OAuth app credentials.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct OAuthConfig {
    /// App client ID (API key)
    pub api_key: String,
    /// App client secret
    pub api_secret: SecretString,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl OAuthConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = get_optional_env("SHOPIFY_API_KEY");
        let api_secret = get_optional_env("SHOPIFY_API_SECRET");

        match (api_key, api_secret) {
            (Some(key), Some(secret)) => {
                validate_secret_strength(&secret, "SHOPIFY_API_SECRET")?;
                Ok(Some(Self {
                    api_key: key,
                    api_secret: SecretString::from(secret),
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_API_*".to_string(),
                "Both SHOPIFY_API_KEY and SHOPIFY_API_SECRET must be set together".to_string(),
            )),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env()?;
        let oauth = OAuthConfig::from_env()?;
        let frontend_url = get_optional_env("FRONTEND_URL");
        let allowed_origins = get_optional_env("ALLOWED_ORIGINS").map_or_else(
            || {
                DEFAULT_ALLOWED_ORIGINS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            },
            |raw| parse_origins(&raw),
        );
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            shopify,
            oauth,
            frontend_url,
            allowed_origins,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the OAuth configuration, if the auth routes are enabled.
    #[must_use]
    pub const fn oauth(&self) -> Option<&OAuthConfig> {
        self.oauth.as_ref()
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE_DOMAIN")?;
        let storefront_domain =
            get_optional_env("SHOPIFY_STOREFRONT_DOMAIN").unwrap_or_else(|| store.clone());
        let timeout_secs = get_env_or_default("SHOPIFY_TIMEOUT_SECS", "")
            .parse::<u64>()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            store,
            storefront_domain,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ADMIN_API_TOKEN")?,
            api_base_url: get_optional_env("SHOPIFY_API_BASE_URL"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated origin list.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
