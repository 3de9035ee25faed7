//! Stock adjustment error types.

use lantern_core::{ProductId, Quantity};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while reducing stock.
#[derive(Debug, Error)]
pub enum StockError {
    /// Caller supplied a bad product ID or quantity. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not enough units left. Stock was not changed.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: Quantity,
        available: i32,
    },

    /// No such product in the store.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The store failed; whether stock changed is unknown.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    /// Anything else (e.g., the adjustment task panicked).
    #[error("unknown stock error: {0}")]
    Unknown(String),
}

impl StockError {
    /// Stable machine-readable code for logs and response headers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::NotFound(_) => "not_found",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Whether a retry could succeed.
    ///
    /// Only storage failures qualify, and even then a retry may apply the
    /// decrement twice: there is no idempotency key.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
