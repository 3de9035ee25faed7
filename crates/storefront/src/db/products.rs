//! Product repository for database operations.
//!
//! Queries are runtime-checked (`query_as` + `FromRow`) so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use lantern_core::{ProductId, Quantity};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{NewProduct, Product};
use crate::store::Decrement;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, stock, created_at, updated_at
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List all products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, stock, created_at, updated_at
            FROM storefront.product
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Insert a product or replace an existing row with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a check constraint rejects the
    /// row (negative price or stock).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO storefront.product (id, name, price, stock)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
               SET name = EXCLUDED.name,
                   price = EXCLUDED.price,
                   stock = EXCLUDED.stock,
                   updated_at = now()
            RETURNING id, name, price, stock, created_at, updated_at
            ",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict(format!(
                    "product {} violates a check constraint",
                    product.id
                ));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Atomically subtract `amount` from a product's stock if enough remains.
    ///
    /// The check and the write happen in one conditional `UPDATE`, so two
    /// concurrent calls can never both take the last units. When no row is
    /// updated, a follow-up read tells an unknown product apart from
    /// insufficient stock; that read does not affect correctness.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn decrement_if_sufficient(
        &self,
        id: &ProductId,
        amount: Quantity,
    ) -> Result<Decrement, RepositoryError> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE storefront.product
               SET stock = stock - $2,
                   updated_at = now()
             WHERE id = $1
               AND stock >= $2
            RETURNING stock
            ",
        )
        .bind(id)
        .bind(amount.as_i32())
        .fetch_optional(self.pool)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(Decrement::Applied { remaining });
        }

        let available: Option<i32> =
            sqlx::query_scalar("SELECT stock FROM storefront.product WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(available.map_or(Decrement::NotFound, |available| {
            Decrement::Insufficient { available }
        }))
    }

    /// Cheap connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool).await?;
        Ok(())
    }
}
