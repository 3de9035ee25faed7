//! Catalog seeding from YAML.
//!
//! ```yaml
//! products:
//!   - id: lantern-brass
//!     name: Brass Lantern
//!     price: "42.00"
//!     stock: 12
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::NewProduct;
use crate::store::{ProductStore, StoreError};

/// Errors loading or applying a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("seed file lists product {0} more than once")]
    DuplicateProduct(String),
}

/// Contents of a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

impl SeedFile {
    /// Parse and validate YAML seed content.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML or invalid fields, and
    /// `SeedError::DuplicateProduct` when an ID appears twice.
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        let seed: Self = serde_yaml::from_str(content)?;
        let mut seen = HashSet::new();
        for product in &seed.products {
            if !seen.insert(product.id.as_str()) {
                return Err(SeedError::DuplicateProduct(product.id.to_string()));
            }
        }
        Ok(seed)
    }

    /// Read and parse a seed file from disk.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }
}

/// Summary of a seeding run.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub upserted: usize,
    pub errors: Vec<(String, StoreError)>,
}

/// Upsert every product in `seed`, continuing past individual failures.
pub async fn apply(store: &dyn ProductStore, seed: &SeedFile) -> SeedReport {
    let mut report = SeedReport::default();
    for product in &seed.products {
        match store.upsert_product(product).await {
            Ok(_) => report.upserted += 1,
            Err(e) => {
                tracing::error!(product_id = %product.id, error = %e, "failed to seed product");
                report.errors.push((product.id.to_string(), e));
            }
        }
    }
    tracing::info!(
        upserted = report.upserted,
        failed = report.errors.len(),
        "catalog seeded"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::{MemoryRowStore, SerializedStore};

    const SEED: &str = r#"
products:
  - id: lantern-brass
    name: Brass Lantern
    price: "42.00"
    stock: 12
  - id: wick-pack
    name: Wick Pack
    price: "3.50"
    stock: 0
"#;

    #[test]
    fn test_parse_seed() {
        let seed = SeedFile::parse(SEED).unwrap();
        assert_eq!(seed.products.len(), 2);
        assert_eq!(seed.products[1].price, Decimal::new(350, 2));
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let content = r#"
products:
  - { id: a, name: A, price: "1.00", stock: 1 }
  - { id: a, name: A again, price: "1.00", stock: 2 }
"#;
        assert!(matches!(
            SeedFile::parse(content),
            Err(SeedError::DuplicateProduct(id)) if id == "a"
        ));
    }

    #[test]
    fn test_parse_rejects_blank_id() {
        let content = r#"
products:
  - { id: "", name: Nameless, price: "1.00", stock: 1 }
"#;
        assert!(matches!(SeedFile::parse(content), Err(SeedError::Parse(_))));
    }

    #[tokio::test]
    async fn test_apply_reports_failures() {
        let content = r#"
products:
  - { id: ok, name: Fine, price: "1.00", stock: 1 }
  - { id: bad, name: Broken, price: "1.00", stock: -4 }
"#;
        let store = SerializedStore::new(MemoryRowStore::new());
        let report = apply(&store, &SeedFile::parse(content).unwrap()).await;

        assert_eq!(report.upserted, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "bad");
    }
}
