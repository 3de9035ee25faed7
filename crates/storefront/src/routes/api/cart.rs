//! Session cart and checkout endpoints.
//!
//! The cart lives in the visitor's session under `session_keys::CART`.
//! Unit prices are copied from the catalog when a product is first added.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lantern_core::{
    Cart, CartItem, CartState, CurrencyCode, Price, ProductId, Quantity, Totals, calculate_totals,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::services::{CheckoutService, stock};
use crate::state::AppState;

/// Cart line as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
    pub display_line_total: String,
}

/// Cart as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub totals: Totals,
    pub state: CartState,
    /// ISO code of the storefront currency.
    pub currency: &'static str,
    pub display_subtotal: String,
}

impl CartView {
    fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        let totals = calculate_totals(cart);
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    line_total: item.line_total(),
                    display_line_total: Price::new(item.unit_price, currency)
                        .times(item.quantity)
                        .display(),
                    item: item.clone(),
                })
                .collect(),
            display_subtotal: Price::new(totals.subtotal, currency).display(),
            totals,
            state: cart.state(),
            currency: currency.code(),
        }
    }
}

/// Add-to-cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove-from-cart request. Without `quantity` the whole line goes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub product_id: String,
    pub quantity: Option<i64>,
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    if cart.is_empty() {
        session.remove::<Cart>(session_keys::CART).await?;
    } else {
        session.insert(session_keys::CART, cart).await?;
    }
    Ok(())
}

fn view(state: &AppState, cart: &Cart) -> Json<CartView> {
    Json(CartView::new(cart, state.config().currency))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the session cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(view(&state, &cart))
}

/// Add a product to the session cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let (product_id, quantity) = stock::validate(&request.product_id, request.quantity)?;

    let product = state
        .store()
        .get_product(&product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {product_id}")))?;

    let mut cart = load_cart(&session).await?;
    cart.add_item(CartItem::new(product.id, quantity, product.price))?;
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(view(&state, &cart))
}

/// Remove some or all of a product from the session cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::parse(request.product_id)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let quantity = request
        .quantity
        .map(Quantity::new)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut cart = load_cart(&session).await?;
    cart.remove_item(&product_id, quantity)?;
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(view(&state, &cart))
}

/// Empty the session cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(view(&state, &Cart::new()))
}

/// Check out the session cart.
///
/// Stock is reduced for a snapshot of the cart, then the reserved quantities
/// are taken out of the cart. When every line is reserved the report comes
/// back with `200`. Otherwise it comes back with `409` and the cart keeps
/// only what still has to be bought, so a retry never reduces a reserved
/// line twice.
///
/// The session record is saved whole, so a cart change made by a concurrent
/// request from the same visitor is overwritten (last write wins).
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let snapshot = load_cart(&session).await?;
    let report = CheckoutService::new(state.stock()).submit(snapshot).await?;

    let mut cart = load_cart(&session).await?;
    report.settle(&mut cart);
    save_cart(&session, &cart).await?;

    if report.fulfilled {
        add_breadcrumb("checkout", "Checkout fulfilled", None);
        Ok((StatusCode::OK, Json(report)).into_response())
    } else {
        add_breadcrumb("checkout", "Checkout not fulfilled", None);
        Ok((StatusCode::CONFLICT, Json(report)).into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    #[test]
    fn test_cart_view_totals_and_display() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(pid("A"), Quantity::new(2).unwrap(), Decimal::new(1000, 2)))
            .unwrap();
        cart.add_item(CartItem::new(pid("B"), Quantity::ONE, Decimal::new(550, 2)))
            .unwrap();

        let json = serde_json::to_value(CartView::new(&cart, CurrencyCode::EUR)).unwrap();
        assert_eq!(json["state"], "non_empty");
        assert_eq!(json["totals"]["subtotal"], "25.50");
        assert_eq!(json["displaySubtotal"], "€25.50");
        assert_eq!(json["items"][0]["productId"], "A");
        assert_eq!(json["items"][0]["lineTotal"], "20.00");
        assert_eq!(json["items"][0]["displayLineTotal"], "€20.00");
        assert_eq!(json["items"][1]["displayLineTotal"], "€5.50");
        assert_eq!(json["currency"], "EUR");
    }

    #[test]
    fn test_empty_cart_view() {
        let json = serde_json::to_value(CartView::new(&Cart::new(), CurrencyCode::USD)).unwrap();
        assert_eq!(json["state"], "empty");
        assert_eq!(json["items"].as_array().unwrap().len(), 0);
        assert_eq!(json["displaySubtotal"], "$0.00");
        assert_eq!(json["currency"], "USD");
    }
}
