//! Catalog product as stored by the product store.

use chrono::{DateTime, Utc};
use lantern_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product with its stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the storefront currency.
    pub price: Decimal,
    /// Sellable units. Never negative.
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Product fields supplied when creating or replacing a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}
