//! Integration tests for the session cart.

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use shopfront_integration_tests::TestContext;

async fn add(ctx: &TestContext, body: Value) -> (StatusCode, Value) {
    ctx.send(Method::POST, "/api/cart/items", Some(body)).await
}

fn line_id(mutation: &Value) -> String {
    mutation["lineId"].as_str().expect("line id").to_string()
}

#[tokio::test]
async fn test_adding_same_item_merges_lines() {
    let ctx = TestContext::new().await;

    let (status, first) = add(&ctx, json!({"productId": "p-tee"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["outcome"], "applied");
    assert_eq!(first["cart"]["lines"][0]["unitPrice"], "150000");
    assert_eq!(first["cart"]["lines"][0]["image"], "https://cdn.example.com/tee.jpg");

    let (_, second) = add(&ctx, json!({"productId": "p-tee"})).await;
    assert_eq!(line_id(&first), line_id(&second));

    let cart = &second["cart"];
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["quantity"], 2);
    assert_eq!(cart["lines"][0]["lineTotal"], "300000");
    assert_eq!(cart["itemCount"], 2);
    assert_eq!(cart["subtotal"], "300000");
}

#[tokio::test]
async fn test_variants_are_priced_and_kept_apart() {
    let ctx = TestContext::new().await;

    let (status, white) = add(
        &ctx,
        json!({"productId": "p-shirt", "variant": {"color": "Trắng", "size": "M"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(white["cart"]["lines"][0]["unitPrice"], "360000");
    assert_eq!(white["cart"]["lines"][0]["variant"]["color"], "Trắng");

    let (_, plain) = add(&ctx, json!({"productId": "p-shirt"})).await;
    assert_ne!(line_id(&white), line_id(&plain));
    assert_eq!(plain["cart"]["lines"][1]["unitPrice"], "350000");
    assert_eq!(plain["cart"]["subtotal"], "710000");

    let (status, body) = add(
        &ctx,
        json!({"productId": "p-shirt", "variant": {"color": "Xanh", "size": "XXL"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Linen shirt"));
}

#[tokio::test]
async fn test_client_cannot_set_price() {
    let ctx = TestContext::new().await;

    let (_, mutation) = add(&ctx, json!({"productId": "p-mug", "unitPrice": "1"})).await;
    assert_eq!(mutation["cart"]["lines"][0]["unitPrice"], "50000");
}

#[tokio::test]
async fn test_unavailable_and_unknown_products_are_refused() {
    let ctx = TestContext::new().await;

    let (status, body) = add(&ctx, json!({"productId": "p-dress"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .ends_with("Summer dress is Hết hàng")
    );

    let (status, _) = add(&ctx, json!({"productId": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, cart) = ctx.get("/api/cart").await;
    assert!(cart["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_quantity_never_drops_below_one() {
    let ctx = TestContext::new().await;
    let (_, added) = add(&ctx, json!({"productId": "p-tee"})).await;
    let path = format!("/api/cart/items/{}", line_id(&added));

    let (_, up) = ctx
        .send(Method::PATCH, &path, Some(json!({"delta": 2})))
        .await;
    assert_eq!(up["outcome"], "applied");
    assert_eq!(up["cart"]["lines"][0]["quantity"], 3);

    let (_, too_far) = ctx
        .send(Method::PATCH, &path, Some(json!({"delta": -3})))
        .await;
    assert_eq!(too_far["outcome"], "rejected");
    assert_eq!(too_far["cart"]["lines"][0]["quantity"], 3);

    let (_, down) = ctx
        .send(Method::PATCH, &path, Some(json!({"delta": -2})))
        .await;
    assert_eq!(down["outcome"], "applied");
    assert_eq!(down["cart"]["lines"][0]["quantity"], 1);

    let (_, count) = ctx.get("/api/cart/count").await;
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn test_total_of_selected_lines() {
    let ctx = TestContext::new().await;
    let (_, tee) = add(&ctx, json!({"productId": "p-tee"})).await;
    add(&ctx, json!({"productId": "p-tee"})).await;
    let (_, mug) = add(&ctx, json!({"productId": "p-mug"})).await;

    let (_, total) = ctx
        .send(
            Method::POST,
            "/api/cart/total",
            Some(json!({"lineIds": [line_id(&tee)]})),
        )
        .await;
    assert_eq!(total["total"], "300000");

    let (_, total) = ctx
        .send(
            Method::POST,
            "/api/cart/total",
            Some(json!({"lineIds": [line_id(&mug), "7f0c4a52-4f5e-4f5b-9a7e-0d1d1c0a9b11"]})),
        )
        .await;
    assert_eq!(total["total"], "50000");

    let (_, total) = ctx
        .send(Method::POST, "/api/cart/total", Some(json!({"lineIds": []})))
        .await;
    assert_eq!(total["total"], "0");
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = TestContext::new().await;
    let (_, tee) = add(&ctx, json!({"productId": "p-tee"})).await;
    add(&ctx, json!({"productId": "p-mug"})).await;
    let path = format!("/api/cart/items/{}", line_id(&tee));

    let (_, removed) = ctx.send(Method::DELETE, &path, None).await;
    assert_eq!(removed["outcome"], "applied");
    assert_eq!(removed["cart"]["lines"][0]["productId"], "p-mug");

    let (_, again) = ctx.send(Method::DELETE, &path, None).await;
    assert_eq!(again["outcome"], "rejected");

    let (_, cleared) = ctx.send(Method::DELETE, "/api/cart", None).await;
    assert_eq!(cleared["outcome"], "applied");
    assert_eq!(cleared["cart"]["itemCount"], 0);

    let (_, empty) = ctx.send(Method::DELETE, "/api/cart", None).await;
    assert_eq!(empty["outcome"], "rejected");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let ctx = TestContext::new().await;
    add(&ctx, json!({"productId": "p-tee"})).await;

    let other = ctx.new_shopper();
    let (_, cart) = ctx
        .send_as(&other, Method::GET, "/api/cart", None)
        .await;
    assert!(cart["lines"].as_array().unwrap().is_empty());
    assert_eq!(cart["subtotal"], "0");

    let (_, mine) = ctx.get("/api/cart").await;
    assert_eq!(mine["itemCount"], 1);
}
