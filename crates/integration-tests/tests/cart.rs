//! Session cart and checkout flows.

use lantern_integration_tests::TestContext;
use serde_json::{Value, json};

async fn add(ctx: &TestContext, id: &str, quantity: i64) -> (u16, Value) {
    ctx.post_json(
        "/api/cart/items",
        &json!({ "productId": id, "quantity": quantity }),
    )
    .await
}

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let ctx = TestContext::new(&[]).await;

    let (status, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart["state"], "empty");
    assert_eq!(cart["totals"]["subtotal"], "0");
    assert_eq!(cart["displaySubtotal"], "$0.00");
    assert_eq!(cart["currency"], "USD");
}

#[tokio::test]
async fn test_add_merges_lines_and_totals() {
    let ctx = TestContext::new(&[("A", "10.00", 10), ("B", "5.50", 10)]).await;

    add(&ctx, "A", 1).await;
    add(&ctx, "B", 1).await;
    let (status, cart) = add(&ctx, "A", 2).await;
    assert_eq!(status, 200);

    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["productId"], "A");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(cart["totals"]["subtotal"], "35.50");
    assert_eq!(cart["totals"]["itemCount"], 4);
    assert_eq!(cart["state"], "non_empty");

    // The cart persists in the session.
    let (_, again) = ctx.get_json("/api/cart").await;
    assert_eq!(again, cart);
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let ctx = TestContext::new(&[("A", "10.00", 10)]).await;

    let (status, _) = add(&ctx, "A", 0).await;
    assert_eq!(status, 400);

    let (status, body) = add(&ctx, "ghost", 1).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Product ghost not found");
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = TestContext::new(&[("A", "10.00", 10), ("B", "5.50", 10)]).await;
    add(&ctx, "A", 3).await;
    add(&ctx, "B", 1).await;

    let (status, cart) = ctx
        .post_json(
            "/api/cart/items/remove",
            &json!({ "productId": "A", "quantity": 2 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(cart["items"][0]["quantity"], 1);

    let (_, cart) = ctx
        .post_json("/api/cart/items/remove", &json!({ "productId": "B" }))
        .await;
    assert_eq!(cart["items"].as_array().expect("items").len(), 1);

    let (status, _) = ctx
        .post_json("/api/cart/items/remove", &json!({ "productId": "B" }))
        .await;
    assert_eq!(status, 404);

    let response = ctx
        .client
        .delete(ctx.url("/api/cart"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 200);
    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["state"], "empty");
}

#[tokio::test]
async fn test_visitors_have_separate_carts() {
    let ctx = TestContext::new(&[("A", "10.00", 10)]).await;
    add(&ctx, "A", 2).await;

    let other = ctx.other_visitor();
    let cart: Value = other
        .get(ctx.url("/api/cart"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(cart["state"], "empty");
}

#[tokio::test]
async fn test_checkout_fulfilled_clears_cart() {
    let ctx = TestContext::new(&[("A", "10.00", 5), ("B", "5.50", 1)]).await;
    add(&ctx, "A", 2).await;
    add(&ctx, "B", 1).await;

    let (status, report) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(report["fulfilled"], true);
    assert_eq!(report["totals"]["subtotal"], "25.50");
    assert_eq!(report["lines"][0]["status"], "reserved");
    assert_eq!(report["lines"][1]["status"], "reserved");

    assert_eq!(ctx.stock_of("A").await, 3);
    assert_eq!(ctx.stock_of("B").await, 0);

    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["state"], "empty");
}

#[tokio::test]
async fn test_checkout_partial_failure_keeps_unreserved_lines() {
    let ctx = TestContext::new(&[("A", "10.00", 5), ("B", "5.50", 3)]).await;
    add(&ctx, "A", 1).await;
    add(&ctx, "B", 3).await;

    // Someone else buys B first.
    let (status, _) = ctx
        .post_json(
            "/api/products/reduce-stock",
            &json!({ "productId": "B", "quantity": 2 }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, report) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, 409);
    assert_eq!(report["fulfilled"], false);
    assert_eq!(report["lines"][0]["status"], "reserved");
    assert_eq!(report["lines"][1]["status"], "failed");
    assert_eq!(report["lines"][1]["code"], "insufficient_stock");

    assert_eq!(ctx.stock_of("A").await, 4);
    assert_eq!(ctx.stock_of("B").await, 1);

    // A is paid for; only B is left to buy.
    let (_, cart) = ctx.get_json("/api/cart").await;
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], "B");
    assert_eq!(items[0]["quantity"], 3);

    ctx.restock("B", 3).await;
    let (status, report) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(report["lines"].as_array().expect("lines").len(), 1);
    assert_eq!(report["lines"][0]["productId"], "B");

    // The retry never touches A again.
    assert_eq!(ctx.stock_of("A").await, 4);
    assert_eq!(ctx.stock_of("B").await, 0);

    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["state"], "empty");
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let ctx = TestContext::new(&[]).await;

    let (status, body) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "cart is empty");
}
