//! Derived cart totals.
//!
//! Totals are a pure function of a [`Cart`] snapshot. They are recomputed
//! from scratch on every call and never stored, so they cannot drift from
//! the cart they describe.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Totals for a cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Σ `quantity * unit_price`, pre-tax and pre-shipping, unrounded.
    pub subtotal: Decimal,
    /// Σ `quantity` across lines.
    pub item_count: u64,
    /// Number of distinct lines.
    pub line_count: usize,
}

impl Totals {
    /// Totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        item_count: 0,
        line_count: 0,
    };
}

/// Compute totals for a cart.
///
/// Pure and deterministic: no I/O, and the same cart always yields the same
/// totals. Decimal arithmetic keeps the subtotal exact.
#[must_use]
pub fn calculate_totals(cart: &Cart) -> Totals {
    cart.items()
        .iter()
        .fold(Totals::ZERO, |acc, item| Totals {
            subtotal: acc.subtotal + item.line_total(),
            item_count: acc.item_count + u64::from(item.quantity.get()),
            line_count: acc.line_count + 1,
        })
}
