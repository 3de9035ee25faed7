//! Checkout: turn a cart snapshot into stock reductions.
//!
//! The cart passed in is an owned snapshot. The visitor may keep editing the
//! live session cart while reductions are in flight; those edits never leak
//! into this checkout.

use futures::future::join_all;
use lantern_core::{Cart, CartError, ProductId, Quantity, Totals, calculate_totals};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use super::stock::{StockAdjuster, StockError};

/// Errors that stop a checkout before any stock is touched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
}

/// Result of reducing stock for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineStatus {
    Reserved,
    Failed { code: &'static str, message: String },
}

/// Per-line checkout result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResult {
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(flatten)]
    pub status: LineStatus,
}

/// Outcome of a checkout attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReport {
    pub lines: Vec<LineResult>,
    pub totals: Totals,
    /// True only when every line was reserved.
    pub fulfilled: bool,
}

impl CheckoutReport {
    /// Lines whose stock was reduced.
    pub fn reserved(&self) -> impl Iterator<Item = &LineResult> {
        self.lines
            .iter()
            .filter(|line| line.status == LineStatus::Reserved)
    }

    /// Take the reserved quantities out of `cart`.
    ///
    /// Stock for those lines is already reduced, so leaving them in the cart
    /// would reduce it again on the next checkout. Only the reserved amount
    /// is removed: units added after the snapshot stay in the cart, and
    /// lines the visitor already removed are skipped.
    pub fn settle(&self, cart: &mut Cart) {
        for line in self.reserved() {
            match cart.remove_item(&line.product_id, Some(line.quantity)) {
                Ok(()) | Err(CartError::NotInCart(_)) => {}
                Err(e) => tracing::warn!(error = %e, "could not settle cart line"),
            }
        }
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    stock: &'a StockAdjuster,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(stock: &'a StockAdjuster) -> Self {
        Self { stock }
    }

    /// Reduce stock for every line of `snapshot`.
    ///
    /// Lines are reduced concurrently, each on its own task, and every task
    /// is awaited before returning. A line failure does not undo lines that
    /// succeeded; the report says which is which so the caller can reconcile.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to buy.
    #[instrument(skip_all, fields(lines = snapshot.items().len()))]
    pub async fn submit(&self, snapshot: Cart) -> Result<CheckoutReport, CheckoutError> {
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = calculate_totals(&snapshot);
        let tasks = snapshot
            .items()
            .iter()
            .map(|item| self.stock.spawn_apply(item.product_id.clone(), item.quantity));
        let outcomes = join_all(tasks).await;

        let lines: Vec<LineResult> = snapshot
            .items()
            .iter()
            .zip(outcomes)
            .map(|(item, outcome)| LineResult {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                status: line_status(outcome),
            })
            .collect();

        let fulfilled = lines.iter().all(|l| l.status == LineStatus::Reserved);
        if fulfilled {
            tracing::info!(subtotal = %totals.subtotal, "checkout fulfilled");
        } else {
            let failed = lines.iter().filter(|l| l.status != LineStatus::Reserved).count();
            tracing::warn!(failed, "checkout not fulfilled");
        }

        Ok(CheckoutReport {
            lines,
            totals,
            fulfilled,
        })
    }
}

fn line_status(outcome: Result<(), StockError>) -> LineStatus {
    match outcome {
        Ok(()) => LineStatus::Reserved,
        Err(e) => LineStatus::Failed {
            code: e.code(),
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use lantern_core::CartItem;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::NewProduct;
    use crate::store::{MemoryRowStore, ProductStore, SerializedStore};

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    async fn seeded(stock: &[(&str, i32)]) -> (StockAdjuster, Arc<SerializedStore<MemoryRowStore>>) {
        let store = Arc::new(SerializedStore::new(MemoryRowStore::new()));
        for (id, stock) in stock {
            store
                .upsert_product(&NewProduct {
                    id: pid(id),
                    name: (*id).to_string(),
                    price: Decimal::new(1000, 2),
                    stock: *stock,
                })
                .await
                .unwrap();
        }
        (StockAdjuster::new(store.clone()), store)
    }

    fn cart(lines: &[(&str, i64, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (id, quantity, cents) in lines {
            cart.add_item(CartItem::new(
                pid(id),
                Quantity::new(*quantity).unwrap(),
                Decimal::new(*cents, 2),
            ))
            .unwrap();
        }
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (adjuster, _) = seeded(&[]).await;
        let result = CheckoutService::new(&adjuster).submit(Cart::new()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_all_lines_reserved() {
        let (adjuster, store) = seeded(&[("A", 5), ("B", 1)]).await;
        let report = CheckoutService::new(&adjuster)
            .submit(cart(&[("A", 2, 1000), ("B", 1, 550)]))
            .await
            .unwrap();

        assert!(report.fulfilled);
        assert_eq!(report.totals.subtotal, Decimal::new(2550, 2));
        assert_eq!(report.reserved().count(), 2);
        assert_eq!(store.get_product(&pid("A")).await.unwrap().unwrap().stock, 3);
        assert_eq!(store.get_product(&pid("B")).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_partial_failure_reported_per_line() {
        let (adjuster, store) = seeded(&[("A", 5), ("B", 0)]).await;
        let report = CheckoutService::new(&adjuster)
            .submit(cart(&[("A", 1, 1000), ("B", 1, 1000), ("C", 1, 1000)]))
            .await
            .unwrap();

        assert!(!report.fulfilled);
        assert_eq!(report.lines[0].status, LineStatus::Reserved);
        assert!(matches!(
            report.lines[1].status,
            LineStatus::Failed { code: "insufficient_stock", .. }
        ));
        assert!(matches!(
            report.lines[2].status,
            LineStatus::Failed { code: "not_found", .. }
        ));
        assert_eq!(store.get_product(&pid("A")).await.unwrap().unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_settle_removes_only_reserved_quantities() {
        let (adjuster, _) = seeded(&[("A", 5), ("B", 0)]).await;
        let snapshot = cart(&[("A", 2, 1000), ("B", 1, 1000)]);
        let report = CheckoutService::new(&adjuster)
            .submit(snapshot.clone())
            .await
            .unwrap();

        // The visitor added another A and a C while checkout ran.
        let mut live = snapshot;
        live.add_item(CartItem::new(pid("A"), Quantity::ONE, Decimal::new(1000, 2)))
            .unwrap();
        live.add_item(CartItem::new(pid("C"), Quantity::ONE, Decimal::new(300, 2)))
            .unwrap();

        report.settle(&mut live);

        assert_eq!(live.get(&pid("A")).unwrap().quantity, Quantity::ONE);
        assert_eq!(live.get(&pid("B")).unwrap().quantity, Quantity::ONE);
        assert!(live.get(&pid("C")).is_some());
    }

    #[tokio::test]
    async fn test_settle_fulfilled_snapshot_empties_cart() {
        let (adjuster, _) = seeded(&[("A", 5)]).await;
        let snapshot = cart(&[("A", 2, 1000)]);
        let report = CheckoutService::new(&adjuster)
            .submit(snapshot.clone())
            .await
            .unwrap();

        let mut live = snapshot;
        report.settle(&mut live);
        assert!(live.is_empty());

        // Settling twice, or against a cart that lost the line, is harmless.
        report.settle(&mut live);
        assert!(live.is_empty());
    }

    #[tokio::test]
    async fn test_report_serializes_status_inline() {
        let (adjuster, _) = seeded(&[("A", 5)]).await;
        let report = CheckoutService::new(&adjuster)
            .submit(cart(&[("A", 1, 1000)]))
            .await
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fulfilled"], true);
        assert_eq!(json["lines"][0]["productId"], "A");
        assert_eq!(json["lines"][0]["status"], "reserved");
        assert_eq!(json["totals"]["subtotal"], "10.00");
    }
}
