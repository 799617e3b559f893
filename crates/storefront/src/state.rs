//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CatalogError, CommerceSdk, MemoryCommerce, SaleorClient};
use crate::config::StorefrontConfig;

/// Currency of the in-memory backend when no catalog file is given.
const DEFAULT_CURRENCY: &str = "USD";

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the commerce backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    sdk: Arc<dyn CommerceSdk>,
}

impl AppState {
    /// Create application state around an already-built commerce backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, sdk: Arc<dyn CommerceSdk>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, sdk }),
        }
    }

    /// Create application state, picking the backend from configuration.
    ///
    /// A configured Saleor API URL wins. Otherwise the in-memory backend is
    /// used, seeded from the demo catalog when one is configured.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the demo catalog cannot be loaded.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let saleor = SaleorClient::from_config(&config.commerce);
        let sdk: Arc<dyn CommerceSdk> = if let Some(client) = saleor {
            tracing::info!(
                api_url = %config.commerce.api_url.as_ref().map_or("", |u| u.as_str()),
                channel = %config.commerce.channel,
                "Using Saleor commerce backend"
            );
            Arc::new(client)
        } else if let Some(path) = &config.commerce.demo_catalog {
            Arc::new(MemoryCommerce::load(path)?)
        } else {
            tracing::warn!(
                "No SALEOR_API_URL or STOREFRONT_DEMO_CATALOG set, starting with an empty catalog"
            );
            Arc::new(MemoryCommerce::new(DEFAULT_CURRENCY))
        };

        Ok(Self::new(config, sdk))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the commerce backend.
    #[must_use]
    pub fn sdk(&self) -> &dyn CommerceSdk {
        self.inner.sdk.as_ref()
    }
}
