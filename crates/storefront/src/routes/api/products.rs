//! Catalog and stock endpoints.
//!
//! `POST /api/products/reduce-stock` keeps a fixed response contract that
//! existing clients depend on:
//!
//! | Outcome                                   | Status | Body                                       |
//! |-------------------------------------------|--------|--------------------------------------------|
//! | reduced                                   | 200    | `{"success":true}`                         |
//! | bad `productId` or `quantity`             | 400    | `{"error":"Invalid productId or quantity"}`|
//! | insufficient, unknown product, or storage | 500    | `{"error":"Failed to reduce stock"}`       |
//! | unreadable body or anything unexpected    | 500    | `{"error":"Internal server error"}`        |
//!
//! Adjustment failures also carry the failure code in `x-stock-error`.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use lantern_core::{Price, ProductId};
use serde::Serialize;
use serde_json::{Number, Value, json};
use tracing::instrument;

use crate::error::{AppError, INTERNAL_ERROR_MESSAGE, Result};
use crate::models::Product;
use crate::services::StockError;
use crate::state::AppState;

/// Response header carrying the stock failure code.
pub const STOCK_ERROR_HEADER: &str = "x-stock-error";

const INVALID_INPUT_MESSAGE: &str = "Invalid productId or quantity";
const REDUCE_FAILED_MESSAGE: &str = "Failed to reduce stock";

/// Product as returned by the catalog endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: String,
    pub in_stock: bool,
}

impl ProductView {
    fn new(product: Product, state: &AppState) -> Self {
        let display_price = Price::new(product.price, state.config().currency).display();
        Self {
            in_stock: product.in_stock(),
            display_price,
            product,
        }
    }
}

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = state.store().list_products().await?;
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductView::new(p, &state))
            .collect(),
    ))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = ProductId::parse(id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let product = state
        .store()
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
    Ok(Json(ProductView::new(product, &state)))
}

/// Reduce a product's stock.
///
/// The body is read as raw bytes so a missing or wrong `Content-Type` does
/// not change the outcome; only the JSON itself matters.
#[instrument(skip_all)]
pub async fn reduce_stock(State(state): State<AppState>, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable reduce-stock body");
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
        }
    };

    let Some((product_id, quantity)) = parse_reduce_request(&request) else {
        return error_body(StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE);
    };

    match state.stock().reduce_stock(product_id, quantity).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) if e.is_client_error() => {
            tracing::debug!(reason = %e, "rejected reduce-stock input");
            error_body(StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE)
        }
        Err(e) => {
            if matches!(e, StockError::StorageUnavailable(_) | StockError::Unknown(_)) {
                tracing::error!(
                    error = %e,
                    code = e.code(),
                    retryable = e.is_retryable(),
                    "stock reduction failed"
                );
            } else {
                tracing::info!(error = %e, code = e.code(), "stock reduction refused");
            }
            let mut response =
                error_body(StatusCode::INTERNAL_SERVER_ERROR, REDUCE_FAILED_MESSAGE);
            response.headers_mut().insert(
                STOCK_ERROR_HEADER,
                HeaderValue::from_static(e.code()),
            );
            response
        }
    }
}

/// Pull `productId` and an integral `quantity` out of the request.
///
/// `None` means the shape is wrong. Range checks (blank ID, `quantity <= 0`)
/// are left to stock validation.
fn parse_reduce_request(request: &Value) -> Option<(&str, i64)> {
    let product_id = request.get("productId")?.as_str()?;
    let quantity = match request.get("quantity")? {
        Value::Number(n) => integral(n)?,
        _ => return None,
    };
    Some((product_id, quantity))
}

/// Integer value of a JSON number, accepting integral floats such as `2.0`.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    // Below 2^53 every integral f64 converts exactly.
    (f.trunc() == f && f.abs() < 9.0e15).then_some(f as i64)
}

fn error_body(status: StatusCode, message: &'static str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
