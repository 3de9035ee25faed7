//! Seed the catalog from a YAML file.
//!
//! ```bash
//! lm-cli seed products catalog.yaml
//! lm-cli seed products catalog.yaml --dry-run
//! ```
//!
//! Products are upserted by ID, so re-running a seed file overwrites the
//! name, price, and stock of every product it lists.

use std::path::Path;

use lantern_storefront::seed::{self, SeedError, SeedFile};
use lantern_storefront::store::PgProductStore;
use thiserror::Error;
use tracing::{error, info};

use super::{CommandError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedCommandError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("{0} of {1} products failed to seed")]
    Partial(usize, usize),
}

/// Seed products from `file_path`.
///
/// With `dry_run` the file is parsed and validated but the database is not
/// touched.
///
/// # Errors
///
/// Returns an error if the file is invalid, the database is unreachable, or
/// any product is rejected.
pub async fn products(file_path: &Path, dry_run: bool) -> Result<(), SeedCommandError> {
    info!(path = %file_path.display(), "Loading products from file");
    let seed_data = SeedFile::load(file_path).await?;
    info!(products = seed_data.products.len(), "Parsed seed file");

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let store = PgProductStore::new(connect().await?);
    let report = seed::apply(&store, &seed_data).await;

    info!("Seeding complete!");
    info!("  Products upserted: {}", report.upserted);

    if !report.errors.is_empty() {
        error!("  Errors: {}", report.errors.len());
        for (product_id, err) in &report.errors {
            error!("    - {product_id}: {err}");
        }
        return Err(SeedCommandError::Partial(
            report.errors.len(),
            seed_data.products.len(),
        ));
    }

    Ok(())
}
