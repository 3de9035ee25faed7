//! Business logic services for storefront.
//!
//! # Services
//!
//! - `stock` - Validated, atomic stock reduction
//! - `checkout` - Concurrent per-line stock reduction for a cart snapshot

pub mod checkout;
pub mod stock;

pub use checkout::{CheckoutError, CheckoutReport, CheckoutService, LineResult, LineStatus};
pub use stock::{StockAdjuster, StockError, StockTask};
