//! Stock adjustment service.
//!
//! Validates a stock reduction and applies it through the store's atomic
//! conditional decrement. Never reads stock and writes it back on its own.

mod error;

pub use error::StockError;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use lantern_core::{ProductId, Quantity};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::store::{Decrement, ProductStore};

/// Applies bounded decrements to product stock.
///
/// Cheap to clone; clones share the injected store.
#[derive(Clone)]
pub struct StockAdjuster {
    store: Arc<dyn ProductStore>,
}

impl std::fmt::Debug for StockAdjuster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockAdjuster").finish_non_exhaustive()
    }
}

impl StockAdjuster {
    /// Create an adjuster over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Reduce a product's stock by `quantity`.
    ///
    /// Input is validated before the store is touched. Retrying after a
    /// `StorageUnavailable` error may decrement twice if the first attempt
    /// reached the store: there is no deduplication.
    ///
    /// # Errors
    ///
    /// - `StockError::InvalidArgument` for an empty ID or a quantity `<= 0`
    /// - `StockError::InsufficientStock` if fewer than `quantity` units remain
    /// - `StockError::NotFound` if the product does not exist
    /// - `StockError::StorageUnavailable` if the store fails
    pub async fn reduce_stock(&self, product_id: &str, quantity: i64) -> Result<(), StockError> {
        let (product_id, quantity) = validate(product_id, quantity)?;
        self.apply(&product_id, quantity).await
    }

    /// Reduce stock for an already-validated product and quantity.
    ///
    /// # Errors
    ///
    /// Same as [`StockAdjuster::reduce_stock`], minus `InvalidArgument`.
    #[instrument(skip_all, fields(product_id = %product_id, quantity = %quantity))]
    pub async fn apply(&self, product_id: &ProductId, quantity: Quantity) -> Result<(), StockError> {
        match self
            .store
            .decrement_if_sufficient(product_id, quantity)
            .await
        {
            Ok(Decrement::Applied { remaining }) => {
                tracing::info!(remaining, "stock reduced");
                Ok(())
            }
            Ok(Decrement::Insufficient { available }) => {
                tracing::info!(available, "insufficient stock");
                Err(StockError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested: quantity,
                    available,
                })
            }
            Ok(Decrement::NotFound) => {
                tracing::warn!("stock reduction for unknown product");
                Err(StockError::NotFound(product_id.clone()))
            }
            Err(e) => {
                tracing::error!(error = %e, "stock reduction failed, outcome unknown");
                Err(StockError::StorageUnavailable(e))
            }
        }
    }

    /// Run [`StockAdjuster::apply`] on its own task.
    ///
    /// The reduction runs to completion even if the returned handle is
    /// dropped, so an abandoned checkout cannot cut a decrement short.
    /// Awaiting the handle yields the final result.
    #[must_use]
    pub fn spawn_apply(&self, product_id: ProductId, quantity: Quantity) -> StockTask {
        let adjuster = self.clone();
        StockTask {
            handle: tokio::spawn(async move { adjuster.apply(&product_id, quantity).await }),
        }
    }
}

/// Check a raw product ID and quantity.
///
/// # Errors
///
/// Returns `StockError::InvalidArgument` if either value is out of range.
pub fn validate(product_id: &str, quantity: i64) -> Result<(ProductId, Quantity), StockError> {
    let product_id =
        ProductId::parse(product_id).map_err(|e| StockError::InvalidArgument(e.to_string()))?;
    let quantity =
        Quantity::new(quantity).map_err(|e| StockError::InvalidArgument(e.to_string()))?;
    Ok((product_id, quantity))
}

/// Handle to a spawned stock reduction.
#[derive(Debug)]
pub struct StockTask {
    handle: JoinHandle<Result<(), StockError>>,
}

impl Future for StockTask {
    type Output = Result<(), StockError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| Err(StockError::Unknown(format!("stock task failed: {e}"))))
        })
    }
}
