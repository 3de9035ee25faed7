//! `PostgreSQL`-backed product store.

use async_trait::async_trait;
use lantern_core::{ProductId, Quantity};
use sqlx::PgPool;

use super::{Decrement, ProductStore, StoreError, validate_row};
use crate::db::ProductRepository;
use crate::models::{NewProduct, Product};

/// Product store over the `storefront.product` table.
///
/// Stock decrements are a single conditional `UPDATE`, so this store needs no
/// application-level locking.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool (shared with the session store).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn repo(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.repo().get(id).await?)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.repo().list().await?)
    }

    async fn upsert_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        validate_row(product)?;
        Ok(self.repo().upsert(product).await?)
    }

    async fn decrement_if_sufficient(
        &self,
        id: &ProductId,
        amount: Quantity,
    ) -> Result<Decrement, StoreError> {
        Ok(self.repo().decrement_if_sufficient(id, amount).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.repo().ping().await?)
    }
}
