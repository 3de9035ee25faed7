//! Integration tests for Lantern Market.
//!
//! Each test starts its own storefront on an ephemeral port, backed by the
//! in-memory product store and in-memory sessions, and talks to it over
//! real HTTP with a cookie-enabled client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lantern-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use lantern_core::{CurrencyCode, ProductId};
use lantern_storefront::build_app;
use lantern_storefront::config::{SentryConfig, StoreBackend, StorefrontConfig};
use lantern_storefront::models::NewProduct;
use lantern_storefront::state::AppState;
use lantern_storefront::store::{MemoryRowStore, ProductStore, SerializedStore};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tokio::task::JoinHandle;
use tower_sessions::MemoryStore;

/// Catalog row for seeding a test server: `(id, price, stock)`.
pub type Seed<'a> = (&'a str, &'a str, i32);

/// A running storefront plus a client with its own cookie jar.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: Arc<SerializedStore<MemoryRowStore>>,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a storefront seeded with `products`.
    pub async fn new(products: &[Seed<'_>]) -> Self {
        Self::with_rows(MemoryRowStore::new(), products).await
    }

    /// Start a storefront whose store waits `latency` on every call.
    pub async fn with_latency(latency: Duration, products: &[Seed<'_>]) -> Self {
        Self::with_rows(MemoryRowStore::new().with_latency(latency), products).await
    }

    async fn with_rows(rows: MemoryRowStore, products: &[Seed<'_>]) -> Self {
        let store = Arc::new(SerializedStore::new(rows));
        for (id, price, stock) in products {
            store
                .upsert_product(&NewProduct {
                    id: ProductId::parse(*id).expect("valid product id"),
                    name: format!("Product {id}"),
                    price: price.parse::<Decimal>().expect("valid price"),
                    stock: *stock,
                })
                .await
                .expect("seed product");
        }

        let state = AppState::new(test_config(), store.clone());
        let app = build_app(state, MemoryStore::default()).expect("build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        Self {
            client: new_client(),
            base_url: format!("http://{addr}"),
            store,
            server,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A second visitor: same server, empty cookie jar.
    #[must_use]
    pub fn other_visitor(&self) -> Client {
        new_client()
    }

    /// Current stock of `id`, read straight from the store.
    pub async fn stock_of(&self, id: &str) -> i32 {
        self.store
            .get_product(&ProductId::parse(id).expect("valid product id"))
            .await
            .expect("store read")
            .expect("product exists")
            .stock
    }

    /// Overwrite the stock of an existing product.
    pub async fn restock(&self, id: &str, stock: i32) {
        let product = self
            .store
            .get_product(&ProductId::parse(id).expect("valid product id"))
            .await
            .expect("store read")
            .expect("product exists");
        self.store
            .upsert_product(&NewProduct {
                id: product.id,
                name: product.name,
                price: product.price,
                stock,
            })
            .await
            .expect("restock product");
    }

    /// `POST` a JSON body and return status and parsed JSON.
    pub async fn post_json(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("json body"))
    }

    /// `GET` and return status and parsed JSON.
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("json body"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        store: StoreBackend::Memory { seed_file: None },
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        session_secret: SecretString::from(
            "Hk3vP9qLw2xRt7mN4bYc8dZf1gJs6aUe5iOo0RtyQWEnM3LkjH7gF2dS9aZx4CvB".to_string(),
        ),
        currency: CurrencyCode::USD,
        sentry: SentryConfig::default(),
    }
}
