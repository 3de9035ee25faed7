//! Atomic decrement on top of a non-atomic row store.

use async_trait::async_trait;
use lantern_core::{ProductId, Quantity};

use super::{Decrement, KeyedLocks, ProductStore, RowStore, StoreError};
use crate::models::{NewProduct, Product};

/// Adapts a [`RowStore`] into a [`ProductStore`].
///
/// Writes to a product run under that product's lock, so the read-check-write
/// in `decrement_if_sufficient` cannot interleave with another write to the
/// same row made through this adapter. Writes that bypass the adapter are not
/// covered.
#[derive(Debug)]
pub struct SerializedStore<R> {
    rows: R,
    locks: KeyedLocks<ProductId>,
}

impl<R: RowStore> SerializedStore<R> {
    #[must_use]
    pub fn new(rows: R) -> Self {
        Self {
            rows,
            locks: KeyedLocks::new(),
        }
    }

    /// The wrapped row store.
    #[must_use]
    pub const fn rows(&self) -> &R {
        &self.rows
    }

    /// Number of products with a lock currently held or awaited.
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.active()
    }
}

#[async_trait]
impl<R: RowStore> ProductStore for SerializedStore<R> {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.rows.read_row(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.rows.list_rows().await
    }

    async fn upsert_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let _guard = self.locks.lock(&product.id).await;
        self.rows.upsert_row(product).await
    }

    async fn decrement_if_sufficient(
        &self,
        id: &ProductId,
        amount: Quantity,
    ) -> Result<Decrement, StoreError> {
        let _guard = self.locks.lock(id).await;

        let Some(product) = self.rows.read_row(id).await? else {
            return Ok(Decrement::NotFound);
        };

        // stock >= 0 and amount <= i32::MAX, so this cannot overflow.
        let remaining = product.stock - amount.as_i32();
        if remaining < 0 {
            return Ok(Decrement::Insufficient {
                available: product.stock,
            });
        }

        self.rows.update_row(id, remaining).await?;
        Ok(Decrement::Applied { remaining })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.rows.ping().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryRowStore;

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    async fn store_with(stock: i32, latency: Option<Duration>) -> SerializedStore<MemoryRowStore> {
        let rows = match latency {
            Some(latency) => MemoryRowStore::new().with_latency(latency),
            None => MemoryRowStore::new(),
        };
        let store = SerializedStore::new(rows);
        store
            .upsert_product(&NewProduct {
                id: pid("p1"),
                name: "Lantern".to_string(),
                price: Decimal::new(2500, 2),
                stock,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_decrement_applies() {
        let store = store_with(5, None).await;
        let outcome = store
            .decrement_if_sufficient(&pid("p1"), Quantity::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(outcome, Decrement::Applied { remaining: 2 });
        assert_eq!(store.get_product(&pid("p1")).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_decrement_to_exactly_zero() {
        let store = store_with(4, None).await;
        let outcome = store
            .decrement_if_sufficient(&pid("p1"), Quantity::new(4).unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, Decrement::Applied { remaining: 0 });
    }

    #[tokio::test]
    async fn test_insufficient_leaves_stock() {
        let store = store_with(2, None).await;
        let outcome = store
            .decrement_if_sufficient(&pid("p1"), Quantity::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(outcome, Decrement::Insufficient { available: 2 });
        assert_eq!(store.get_product(&pid("p1")).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let store = store_with(2, None).await;
        let outcome = store
            .decrement_if_sufficient(&pid("missing-id"), Quantity::ONE)
            .await
            .unwrap();
        assert_eq!(outcome, Decrement::NotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decrements_never_oversell() {
        let store = Arc::new(store_with(10, Some(Duration::from_millis(2))).await);

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .decrement_if_sufficient(&pid("p1"), Quantity::ONE)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut applied = 0;
        for task in tasks {
            if matches!(task.await.unwrap(), Decrement::Applied { .. }) {
                applied += 1;
            }
        }

        assert_eq!(applied, 10);
        assert_eq!(store.get_product(&pid("p1")).await.unwrap().unwrap().stock, 0);
        assert_eq!(store.active_locks(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = store_with(5, None).await;
        store.rows().set_offline(true);

        let result = store
            .decrement_if_sufficient(&pid("p1"), Quantity::ONE)
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.rows().set_offline(false);
        assert_eq!(store.get_product(&pid("p1")).await.unwrap().unwrap().stock, 5);
    }
}
