//! Integration tests for catalog administration through the storefront.

#![allow(clippy::unwrap_used)]

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use shopfront_integration_tests::TestContext;

fn child_ids(tree: &Value, root: usize) -> Vec<&str> {
    tree[root]["children"]
        .as_array()
        .expect("children")
        .iter()
        .map(|child| child["_id"].as_str().expect("id"))
        .collect()
}

fn image(file_name: &str, mime: &str) -> Part {
    Part::bytes(vec![0xff, 0xd8, 0xff, 0xe0])
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("valid mime")
}

async fn post_product(ctx: &TestContext, form: Form) -> (StatusCode, Value) {
    let response = ctx
        .client
        .post(ctx.url("/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("storefront request");
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

// ============================================================================
// Category Writes
// ============================================================================

#[tokio::test]
async fn test_created_category_shows_up_in_cached_tree() {
    let ctx = TestContext::new().await;
    // Prime the cache.
    ctx.get("/api/categories").await;

    let (status, created) = ctx
        .send(
            Method::POST,
            "/admin/categories",
            Some(json!({"name": "  Quần  ", "parent": "men"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Quần");
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, tree) = ctx.get("/api/categories").await;
    assert_eq!(child_ids(&tree, 0), ["shirts", "tees", id.as_str()]);
}

#[tokio::test]
async fn test_embedded_parent_is_accepted() {
    let ctx = TestContext::new().await;

    let (status, created) = ctx
        .send(
            Method::POST,
            "/admin/categories",
            Some(json!({"name": "Đầm", "parent": {"_id": "women", "name": "Nữ"}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["parent"], "women");

    let (_, tree) = ctx.get("/api/categories").await;
    assert_eq!(child_ids(&tree, 1).len(), 2);
}

#[tokio::test]
async fn test_blank_name_never_reaches_catalog() {
    let ctx = TestContext::new().await;
    let before = ctx.catalog.request_count();

    let (status, body) = ctx
        .send(Method::POST, "/admin/categories", Some(json!({"name": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name cannot be blank");
    assert_eq!(ctx.catalog.request_count(), before);
}

#[tokio::test]
async fn test_rename_and_delete_category() {
    let ctx = TestContext::new().await;
    ctx.get("/api/categories").await;

    let (status, renamed) = ctx
        .send(
            Method::PUT,
            "/admin/categories/men",
            Some(json!({"name": "Thời trang nam"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Thời trang nam");

    let (_, detail) = ctx.get("/api/categories/shirts").await;
    assert_eq!(detail["displayPath"], "Thời trang nam / Áo sơ mi");

    let (status, _) = ctx
        .send(Method::DELETE, "/admin/categories/dresses", None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tree) = ctx.get("/api/categories").await;
    assert!(child_ids(&tree, 1).is_empty());

    let (status, _) = ctx
        .send(Method::DELETE, "/admin/categories/dresses", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send(Method::PUT, "/admin/categories/nope", Some(json!({"name": "X"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Product Writes
// ============================================================================

#[tokio::test]
async fn test_create_product_with_image() {
    let ctx = TestContext::new().await;
    ctx.get("/api/products").await;

    let form = Form::new()
        .text("name", "Oxford shirt")
        .text("price", "410000")
        .text("category", "shirts")
        .text("colors", "Trắng")
        .part("image", image("oxford.jpg", "image/jpeg"));

    let (status, created) = post_product(&ctx, form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["image"], "/uploads/oxford.jpg");
    assert_eq!(created["status"], "Còn hàng");

    let (_, shirts) = ctx.get("/api/products?category=men").await;
    let names: Vec<&str> = shirts
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Oxford shirt"));
}

#[tokio::test]
async fn test_invalid_product_forms_are_rejected() {
    let ctx = TestContext::new().await;

    let not_image = Form::new()
        .text("name", "Notes")
        .text("price", "1000")
        .text("category", "shirts")
        .part("image", image("notes.txt", "text/plain"));
    let (status, _) = post_product(&ctx, not_image).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_image = Form::new()
        .text("name", "Ghost")
        .text("price", "1000")
        .text("category", "shirts");
    let (status, _) = post_product(&ctx, no_image).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_price = Form::new()
        .text("name", "Shirt")
        .text("price", "cheap")
        .text("category", "shirts")
        .part("image", image("shirt.jpg", "image/jpeg"));
    let (status, _) = post_product(&ctx, bad_price).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_category = Form::new()
        .text("name", "Shirt")
        .text("price", "1000")
        .part("image", image("shirt.jpg", "image/jpeg"));
    let (status, _) = post_product(&ctx, no_category).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_product() {
    let ctx = TestContext::new().await;
    ctx.get("/api/products/p-mug").await;

    let (status, _) = ctx.send(Method::DELETE, "/admin/products/p-mug", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get("/api/products/p-mug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Upstream Failures
// ============================================================================

#[tokio::test]
async fn test_upstream_failures_map_to_status_codes() {
    let ctx = TestContext::new().await;

    ctx.catalog.fail_with(Some(StatusCode::TOO_MANY_REQUESTS));
    let (status, body) = ctx.get("/api/products").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains('7'));

    ctx.catalog.fail_with(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let (status, body) = ctx.get("/api/products").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "External service error");

    ctx.catalog.fail_with(Some(StatusCode::UNPROCESSABLE_ENTITY));
    let (status, body) = ctx
        .send(Method::POST, "/admin/categories", Some(json!({"name": "Mũ"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "injected failure");

    ctx.catalog.fail_with(None);
    let (status, _) = ctx.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
}
