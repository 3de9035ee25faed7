//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness
//! GET    /health/ready               - Readiness (store reachable)
//!
//! # Catalog
//! GET    /api/products               - Product listing
//! GET    /api/products/{id}          - Product detail
//! POST   /api/products/reduce-stock  - Reduce stock for one product
//!
//! # Cart (session)
//! GET    /api/cart                   - Current cart with totals
//! DELETE /api/cart                   - Empty the cart
//! POST   /api/cart/items             - Add a product
//! POST   /api/cart/items/remove      - Remove some or all of a product
//!
//! # Checkout
//! POST   /api/checkout               - Reduce stock for every cart line
//! ```

pub mod api;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api::routes())
}
