//! Process-local row store.
//!
//! Behaves like a remote document store: every call is a separate round trip
//! with no cross-call atomicity. An optional artificial latency widens the
//! window between a read and a following write, and the store can be switched
//! offline to simulate outages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lantern_core::ProductId;
use tokio::sync::RwLock;

use super::{RowStore, StoreError, validate_row};
use crate::models::{NewProduct, Product};

/// In-memory `RowStore`.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: RwLock<HashMap<ProductId, Product>>,
    latency: Option<Duration>,
    offline: AtomicBool,
}

impl MemoryRowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before touching the rows.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn read_row(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.round_trip().await?;
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list_rows(&self) -> Result<Vec<Product>, StoreError> {
        self.round_trip().await?;
        let mut products: Vec<Product> = self.rows.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn upsert_row(&self, product: &NewProduct) -> Result<Product, StoreError> {
        validate_row(product)?;
        self.round_trip().await?;

        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let created_at = rows.get(&product.id).map_or(now, |existing| existing.created_at);
        let row = Product {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            created_at,
            updated_at: now,
        };
        rows.insert(product.id.clone(), row.clone());
        Ok(row)
    }

    async fn update_row(&self, id: &ProductId, stock: i32) -> Result<(), StoreError> {
        if stock < 0 {
            return Err(StoreError::Rejected(format!(
                "product {id} cannot have negative stock {stock}"
            )));
        }
        self.round_trip().await?;

        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::Rejected(format!("product {id} does not exist")))?;
        row.stock = stock;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.round_trip().await
    }
}
