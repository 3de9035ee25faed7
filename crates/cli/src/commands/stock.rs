//! Stock inspection and manual adjustment.
//!
//! ```bash
//! lm-cli stock show lantern-brass
//! lm-cli stock reduce lantern-brass 2
//! ```

use std::sync::Arc;

use lantern_core::ProductId;
use lantern_storefront::services::{StockAdjuster, StockError};
use lantern_storefront::store::{PgProductStore, ProductStore, StoreError};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors from stock commands.
#[derive(Debug, Error)]
pub enum StockCommandError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Invalid product ID: {0}")]
    InvalidProductId(#[from] lantern_core::ProductIdError),

    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Stock(#[from] StockError),
}

/// Print a product's current stock.
///
/// # Errors
///
/// Returns an error if the product does not exist or the database fails.
pub async fn show(product_id: &str) -> Result<(), StockCommandError> {
    let product_id = ProductId::parse(product_id)?;
    let store = PgProductStore::new(connect().await?);

    let product = store
        .get_product(&product_id)
        .await?
        .ok_or(StockCommandError::NotFound(product_id))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{} ({})", product.name, product.id);
        println!("  price: {}", product.price);
        println!("  stock: {}", product.stock);
        println!("  updated: {}", product.updated_at.to_rfc3339());
    }
    Ok(())
}

/// Reduce a product's stock through the same path the API uses.
///
/// # Errors
///
/// Returns the stock error if the reduction is refused or fails.
pub async fn reduce(product_id: &str, quantity: i64) -> Result<(), StockCommandError> {
    let store = Arc::new(PgProductStore::new(connect().await?));
    let adjuster = StockAdjuster::new(store.clone());

    adjuster.reduce_stock(product_id, quantity).await?;

    let product_id = ProductId::parse(product_id)?;
    if let Some(product) = store.get_product(&product_id).await? {
        tracing::info!(
            product_id = %product.id,
            remaining = product.stock,
            "Stock reduced"
        );
    }
    Ok(())
}
