//! Lantern Market Core - Shared domain types.
//!
//! This crate provides the types shared by every Lantern Market component:
//! - `storefront` - Public storefront API (catalog, cart, checkout, stock)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Cart arithmetic lives here so it can be exercised
//! without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, quantities and prices
//! - [`cart`] - Session cart and its mutation rules
//! - [`totals`] - Derived cart totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod totals;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartState};
pub use totals::{Totals, calculate_totals};
pub use types::*;
