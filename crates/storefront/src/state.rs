//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::StockAdjuster;
use crate::store::ProductStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The product store is built
/// once at startup and injected here; handlers never construct their own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn ProductStore>,
    stock: StockAdjuster,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Product store shared by every request
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Arc<dyn ProductStore>) -> Self {
        let stock = StockAdjuster::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                stock,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn store(&self) -> &dyn ProductStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the stock adjuster.
    #[must_use]
    pub fn stock(&self) -> &StockAdjuster {
        &self.inner.stock
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.inner.config.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! Handler test fixtures over the in-memory store.

    use std::sync::Arc;

    use lantern_core::{CurrencyCode, ProductId};
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::AppState;
    use crate::config::{SentryConfig, StoreBackend, StorefrontConfig};
    use crate::models::NewProduct;
    use crate::store::{MemoryRowStore, ProductStore, SerializedStore};

    pub type TestStore = Arc<SerializedStore<MemoryRowStore>>;

    pub fn config() -> StorefrontConfig {
        StorefrontConfig {
            store: StoreBackend::Memory { seed_file: None },
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(
                "Zq8rT2vLw9xKp4mN7bYc1dHf6gJs3aUe0iOo5RtyQWEnM8LkjH2gF4dS6aZx9CvB".to_string(),
            ),
            currency: CurrencyCode::USD,
            sentry: SentryConfig::default(),
        }
    }

    /// State over a fresh in-memory catalog of `(id, price in cents, stock)`.
    pub async fn state_with(products: &[(&str, i64, i32)]) -> (AppState, TestStore) {
        let store: TestStore = Arc::new(SerializedStore::new(MemoryRowStore::new()));
        for (id, cents, stock) in products {
            store
                .upsert_product(&NewProduct {
                    id: ProductId::parse(*id).unwrap(),
                    name: format!("Product {id}"),
                    price: Decimal::new(*cents, 2),
                    stock: *stock,
                })
                .await
                .unwrap();
        }
        (AppState::new(config(), store.clone()), store)
    }

    pub async fn stock_of(store: &TestStore, id: &str) -> i32 {
        store
            .get_product(&ProductId::parse(id).unwrap())
            .await
            .unwrap()
            .unwrap()
            .stock
    }
}
