//! Integration tests for category trees and product listings.

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::Value;
use shopfront_integration_tests::{CatalogFixture, TestContext};

fn ids(values: &Value, key: &str) -> Vec<String> {
    values
        .as_array()
        .expect("array")
        .iter()
        .map(|value| value[key].as_str().expect("string id").to_string())
        .collect()
}

// ============================================================================
// Category Tree Tests
// ============================================================================

#[tokio::test]
async fn test_tree_nests_records_in_any_order() {
    let ctx = TestContext::new().await;

    let (status, tree) = ctx.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&tree, "_id"), ["men", "women"]);

    let men = &tree[0];
    assert_eq!(ids(&men["children"], "_id"), ["shirts", "tees"]);
    assert_eq!(ids(&men["children"][0]["children"], "_id"), ["linen"]);
    assert_eq!(men["children"][1]["parent"], "men");
    assert_eq!(ids(&tree[1]["children"], "_id"), ["dresses"]);
}

#[tokio::test]
async fn test_options_are_indented_pre_order() {
    let ctx = TestContext::new().await;

    let (status, options) = ctx.get("/api/categories/options").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = options
        .as_array()
        .unwrap()
        .iter()
        .map(|option| option["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["Nam", "— Áo sơ mi", "— — Vải lanh", "— Áo thun", "Nữ", "— Váy"]
    );
    assert_eq!(options[2]["depth"], 2);
}

#[tokio::test]
async fn test_category_detail_has_display_path() {
    let ctx = TestContext::new().await;

    let (status, detail) = ctx.get("/api/categories/linen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["displayPath"], "Nam / Áo sơ mi / Vải lanh");

    let (status, body) = ctx.get("/api/categories/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_dangling_parent_is_unreachable() {
    let mut fixture = CatalogFixture::shop();
    fixture
        .categories
        .push(serde_json::json!({"_id": "orphan", "name": "Orphan", "parent": "gone"}));
    let ctx = TestContext::with_fixture(fixture).await;

    let (_, options) = ctx.get("/api/categories/options").await;
    assert!(!ids(&options, "id").contains(&"orphan".to_string()));
}

#[tokio::test]
async fn test_expansion_state_is_per_session() {
    let ctx = TestContext::new().await;

    // Fully expanded until the shopper says otherwise.
    let (_, rows) = ctx.get("/api/categories/rows").await;
    assert_eq!(rows.as_array().unwrap().len(), 6);

    let (status, toggled) = ctx
        .send(Method::POST, "/api/categories/men/toggle", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["expanded"], false);

    let (_, rows) = ctx.get("/api/categories/rows").await;
    assert_eq!(ids(&rows, "id"), ["men", "women", "dresses"]);

    let (_, rows) = ctx
        .send(Method::POST, "/api/categories/collapse-all", None)
        .await;
    assert_eq!(ids(&rows, "id"), ["men", "women"]);
    assert_eq!(rows[0]["hasChildren"], true);
    assert_eq!(rows[0]["expanded"], false);

    // Another shopper still sees the whole tree.
    let other = ctx.new_shopper();
    let (_, rows) = ctx
        .send_as(&other, Method::GET, "/api/categories/rows", None)
        .await;
    assert_eq!(rows.as_array().unwrap().len(), 6);

    let (_, rows) = ctx
        .send(Method::POST, "/api/categories/expand-all", None)
        .await;
    assert_eq!(rows.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_toggle_unknown_category_is_not_found() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .send(Method::POST, "/api/categories/nope/toggle", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Product Listing Tests
// ============================================================================

#[tokio::test]
async fn test_products_filter_by_subtree() {
    let ctx = TestContext::new().await;

    let (_, all) = ctx.get("/api/products").await;
    assert_eq!(all.as_array().unwrap().len(), 4);

    let (_, men) = ctx.get("/api/products?category=men").await;
    assert_eq!(ids(&men, "_id"), ["p-shirt", "p-tee"]);
    assert_eq!(men[0]["categoryName"], "Vải lanh");
    assert_eq!(men[1]["imageUrl"], "https://cdn.example.com/tee.jpg");

    let (_, shirts) = ctx.get("/api/products?category=shirts").await;
    assert_eq!(ids(&shirts, "_id"), ["p-shirt"]);

    // A blank filter means no filter.
    let (_, blank) = ctx.get("/api/products?category=").await;
    assert_eq!(blank.as_array().unwrap().len(), 4);

    let (status, unknown) = ctx.get("/api/products?category=nope").await;
    assert_eq!(status, StatusCode::OK);
    assert!(unknown.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_grouped_by_root_with_uncategorized_last() {
    let ctx = TestContext::new().await;

    let (status, groups) = ctx.get("/api/products/grouped").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|group| group["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Nam", "Nữ", "Uncategorized"]);
    assert_eq!(groups[0]["products"].as_array().unwrap().len(), 2);
    assert_eq!(groups[2]["category"], Value::Null);

    let (_, only) = ctx.get("/api/products/grouped?category=women").await;
    assert_eq!(only.as_array().unwrap().len(), 1);
    assert_eq!(only[0]["name"], "Nữ");
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;

    let (status, shirt) = ctx.get("/api/products/p-shirt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shirt["categoryName"], "Vải lanh");
    assert_eq!(shirt["colorOptions"], serde_json::json!(["Trắng", "Xanh"]));
    assert_eq!(shirt["sizeOptions"], serde_json::json!(["M", "L"]));
    assert_eq!(shirt["displayPrice"], "350000");
    assert_eq!(shirt["available"], true);
    assert_eq!(
        shirt["imageUrl"],
        format!("{}/uploads/linen.jpg", ctx.catalog.url().as_str().trim_end_matches('/'))
    );

    let (_, dress) = ctx.get("/api/products/p-dress").await;
    assert_eq!(dress["available"], false);

    let (_, mug) = ctx.get("/api/products/p-mug").await;
    assert_eq!(mug["categoryName"], Value::Null);

    let (status, _) = ctx.get("/api/products/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_lists_are_cached() {
    let ctx = TestContext::new().await;

    ctx.get("/api/categories").await;
    let after_first = ctx.catalog.request_count();
    ctx.get("/api/categories").await;
    ctx.get("/api/categories/options").await;

    assert_eq!(ctx.catalog.request_count(), after_first);
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_readiness_follows_catalog() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    ctx.catalog.fail_with(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let (status, _) = ctx.get("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
