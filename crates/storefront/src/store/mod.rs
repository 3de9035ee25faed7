//! Product store collaborators.
//!
//! The stock counter lives in a backing store that the storefront treats as
//! a black box with two possible shapes:
//!
//! - [`ProductStore`] exposes an atomic conditional decrement. The `PostgreSQL`
//!   store implements it directly with a single `UPDATE ... WHERE stock >= n`.
//! - [`RowStore`] is a plain document store (`read_row`, `update_row`,
//!   `upsert_row`) with no conditional write. [`SerializedStore`] adapts any
//!   `RowStore` into a `ProductStore` by holding a per-product lock across
//!   the read-modify-write.
//!
//! Stores are constructed once at startup and injected into `AppState`.

pub mod locks;
pub mod memory;
pub mod postgres;
pub mod serialized;

use async_trait::async_trait;
use lantern_core::{ProductId, Quantity};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{NewProduct, Product};

pub use locks::KeyedLocks;
pub use memory::MemoryRowStore;
pub use postgres::PgProductStore;
pub use serialized::SerializedStore;

/// Errors raised by a store. All of them mean the outcome of a write is unknown.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database layer failure.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Backend could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row failed validation on write.
    #[error("rejected row: {0}")]
    Rejected(String),
}

/// Outcome of a conditional decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Stock was reduced; `remaining` is the new value.
    Applied { remaining: i32 },
    /// Not enough stock. Nothing was written.
    Insufficient { available: i32 },
    /// No product with that ID.
    NotFound,
}

/// Store with an atomic "decrement if sufficient" primitive.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch one product.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// List every product.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert or replace a product row.
    async fn upsert_product(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Subtract `amount` from the product's stock iff the result stays `>= 0`.
    ///
    /// Must be atomic with respect to every other decrement of the same product.
    async fn decrement_if_sufficient(
        &self,
        id: &ProductId,
        amount: Quantity,
    ) -> Result<Decrement, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Plain row-level document store without conditional writes.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn read_row(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_rows(&self) -> Result<Vec<Product>, StoreError>;

    async fn upsert_row(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Overwrite the stock column of an existing row.
    async fn update_row(&self, id: &ProductId, stock: i32) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Reject rows that would break catalog invariants.
pub(crate) fn validate_row(product: &NewProduct) -> Result<(), StoreError> {
    if product.stock < 0 {
        return Err(StoreError::Rejected(format!(
            "product {} has negative stock {}",
            product.id, product.stock
        )));
    }
    if product.price < Decimal::ZERO {
        return Err(StoreError::Rejected(format!(
            "product {} has negative price {}",
            product.id, product.price
        )));
    }
    Ok(())
}
