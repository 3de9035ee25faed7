//! Session-related types.

/// Session keys for per-visitor state.
pub mod keys {
    /// Key for the visitor's cart (`lantern_core::Cart`, JSON-encoded).
    pub const CART: &str = "cart";
}
