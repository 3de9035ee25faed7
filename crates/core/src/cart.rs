//! Session cart.
//!
//! A cart is an ordered list of lines keyed by product. It is owned by a single
//! client session and never shared, so all mutation goes through `&mut self`.
//!
//! # Lifecycle
//!
//! ```text
//!            add_item
//!   Empty ─────────────► NonEmpty ◄──┐ add_item / remove_item (lines remain)
//!     ▲                     │  └─────┘
//!     └─────────────────────┘
//!       remove_item (last line) / clear
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, Quantity};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Merging a line would push its quantity past [`Quantity::MAX`].
    #[error("quantity for product {0} would exceed the maximum")]
    QuantityOverflow(ProductId),

    /// The product has no line in this cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Unit prices cannot be negative.
    #[error("unit price for product {0} is negative")]
    NegativePrice(ProductId),
}

/// Whether the cart currently holds any lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Unit price frozen when the product was first added.
    pub unit_price: Decimal,
}

impl CartItem {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// `quantity * unit_price`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// Ordered collection of cart lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current state of the cart.
    #[must_use]
    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    /// Add a line, merging into an existing line for the same product.
    ///
    /// When merging, the quantity is incremented and the existing unit price
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityOverflow` if the merged quantity would be
    /// out of range, or `CartError::NegativePrice` for a negative unit price.
    /// The cart is unchanged on error.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.unit_price < Decimal::ZERO {
            return Err(CartError::NegativePrice(item.product_id));
        }

        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CartError::QuantityOverflow(item.product_id))?;
            }
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Remove `quantity` units of a product, or the whole line when `None`.
    ///
    /// A line whose quantity would reach zero (or below) is deleted rather
    /// than kept at zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product has no line.
    pub fn remove_item(
        &mut self,
        product_id: &ProductId,
        quantity: Option<Quantity>,
    ) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|line| &line.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;

        let remaining = quantity.and_then(|q| {
            self.items
                .get(index)
                .and_then(|line| line.quantity.checked_sub(q))
        });

        match (remaining, self.items.get_mut(index)) {
            (Some(left), Some(line)) => line.quantity = left,
            _ => {
                self.items.remove(index);
            }
        }
        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: i64, cents: i64) -> CartItem {
        CartItem::new(
            ProductId::parse(id).unwrap(),
            Quantity::new(quantity).unwrap(),
            Decimal::new(cents, 2),
        )
    }

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        cart.add_item(item("A", 1, 1000)).unwrap();
        cart.add_item(item("A", 2, 1000)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, pid("A"));
        assert_eq!(cart.items()[0].quantity.get(), 3);
    }

    #[test]
    fn test_merge_keeps_first_unit_price() {
        let mut cart = Cart::new();
        cart.add_item(item("A", 1, 1000)).unwrap();
        cart.add_item(item("A", 1, 1200)).unwrap();
        assert_eq!(cart.items()[0].unit_price, Decimal::new(1000, 2));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(item("B", 1, 100)).unwrap();
        cart.add_item(item("A", 1, 100)).unwrap();
        cart.add_item(item("B", 1, 100)).unwrap();

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
    }

    #[test]
    fn test_add_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(item("A", Quantity::MAX, 100)).unwrap();
        let err = cart.add_item(item("A", 1, 100)).unwrap_err();

        assert_eq!(err, CartError::QuantityOverflow(pid("A")));
        assert_eq!(i64::from(cart.items()[0].quantity), Quantity::MAX);
    }

    #[test]
    fn test_add_rejects_negative_price() {
        let mut cart = Cart::new();
        let err = cart.add_item(item("A", 1, -5)).unwrap_err();
        assert_eq!(err, CartError::NegativePrice(pid("A")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_partial_decrements() {
        let mut cart = Cart::new();
        cart.add_item(item("A", 3, 100)).unwrap();
        cart.remove_item(&pid("A"), Some(Quantity::ONE)).unwrap();
        assert_eq!(cart.get(&pid("A")).unwrap().quantity.get(), 2);
    }

    #[test]
    fn test_remove_to_zero_deletes_line() {
        let mut cart = Cart::new();
        cart.add_item(item("A", 2, 100)).unwrap();
        cart.add_item(item("B", 1, 100)).unwrap();

        cart.remove_item(&pid("A"), Some(Quantity::new(5).unwrap()))
            .unwrap();
        assert!(cart.get(&pid("A")).is_none());
        assert_eq!(cart.state(), CartState::NonEmpty);

        cart.remove_item(&pid("B"), None).unwrap();
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_remove_missing_product() {
        let mut cart = Cart::new();
        let err = cart.remove_item(&pid("nope"), None).unwrap_err();
        assert_eq!(err, CartError::NotInCart(pid("nope")));
    }

    #[test]
    fn test_clear_from_any_state() {
        let mut cart = Cart::new();
        cart.clear();
        assert_eq!(cart.state(), CartState::Empty);

        cart.add_item(item("A", 1, 100)).unwrap();
        cart.clear();
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_serde_shape() {
        let mut cart = Cart::new();
        cart.add_item(item("A", 2, 1000)).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": [{ "productId": "A", "quantity": 2, "unitPrice": "10.00" }]
            })
        );
    }
}
