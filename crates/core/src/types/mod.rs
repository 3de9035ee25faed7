//! Core types for Lantern Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use quantity::{Quantity, QuantityError};
