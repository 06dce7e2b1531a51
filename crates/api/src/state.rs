//! Application state shared across handlers.

use std::sync::Arc;

use crate::analytics::StoreUrls;
use crate::analytics::notifications::{NotificationService, NotificationStore};
use crate::config::ApiConfig;
use crate::shopify::{AdminClient, ShopifyError};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    shopify: AdminClient,
    urls: StoreUrls,
    notifications: NotificationService,
}

impl AppState {
    /// Build state from configuration. Notification state starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ShopifyError> {
        let shopify = AdminClient::new(&config.shopify)?;
        let urls = StoreUrls::from_config(&config.shopify);
        let notifications = NotificationService::new(shopify.clone(), NotificationStore::new());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopify,
                urls,
                notifications,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    #[must_use]
    pub fn urls(&self) -> &StoreUrls {
        &self.inner.urls
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.inner.notifications
    }
}
