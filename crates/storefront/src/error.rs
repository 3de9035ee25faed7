//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`,
//! except the reduce-stock endpoint, which writes its own fixed bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lantern_core::CartError;
use serde_json::json;
use thiserror::Error;

use crate::services::{CheckoutError, StockError};
use crate::store::StoreError;

/// Body used for every response whose cause is not the client's fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Product store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Stock adjustment failed.
    #[error("Stock error: {0}")]
    Stock(#[from] StockError),

    /// Cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout could not start.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session could not be loaded or saved.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::Unavailable(_))
            | Self::Stock(StockError::StorageUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Stock(StockError::InvalidArgument(_))
            | Self::Cart(CartError::QuantityOverflow(_))
            | Self::Checkout(CheckoutError::EmptyCart)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Stock(StockError::NotFound(_))
            | Self::Cart(CartError::NotInCart(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Stock(StockError::InsufficientStock { .. }) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Store(_)
            | Self::Stock(StockError::Unknown(_))
            | Self::Cart(CartError::NegativePrice(_))
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::Unavailable(_))
            | Self::Stock(StockError::StorageUnavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            _ if status.is_server_error() => INTERNAL_ERROR_MESSAGE.to_string(),
            Self::Stock(err) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) | Self::Conflict(msg) => msg.clone(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "lantern-brass")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
