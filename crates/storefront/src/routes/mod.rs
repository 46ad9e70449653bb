//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Catalog reachability
//!
//! # Categories
//! GET    /api/categories                - Nested tree
//! GET    /api/categories/options        - Indented dropdown options
//! GET    /api/categories/rows           - Visible rows of the interactive tree
//! POST   /api/categories/expand-all     - Expand every row
//! POST   /api/categories/collapse-all   - Collapse every row
//! GET    /api/categories/{id}           - Subtree and display path
//! POST   /api/categories/{id}/toggle    - Expand or collapse one row
//!
//! # Products
//! GET    /api/products?category={id}    - Listing, optionally within a subtree
//! GET    /api/products/grouped          - Grouped by root category
//! GET    /api/products/{id}             - Detail with category name
//!
//! # Cart (session)
//! GET    /api/cart                      - Lines, item count, subtotal
//! DELETE /api/cart                      - Empty the cart
//! GET    /api/cart/count                - Item count
//! POST   /api/cart/items                - Add one unit
//! PATCH  /api/cart/items/{line_id}      - Change quantity by delta
//! DELETE /api/cart/items/{line_id}      - Remove a line
//! POST   /api/cart/total                - Total of selected lines
//!
//! # Admin
//! POST   /admin/categories              - Create category
//! PUT    /admin/categories/{id}         - Rename category
//! DELETE /admin/categories/{id}         - Delete category
//! POST   /admin/products                - Create product (multipart)
//! DELETE /admin/products/{id}           - Delete product
//! ```

pub mod admin;
pub mod cart;
pub mod categories;
pub mod health;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::catalog::forms::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the text fields around a maximum-size image.
const PRODUCT_FORM_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/options", get(categories::options))
        .route("/rows", get(categories::rows))
        .route("/expand-all", post(categories::expand_all))
        .route("/collapse-all", post(categories::collapse_all))
        .route("/{id}", get(categories::show))
        .route("/{id}/toggle", post(categories::toggle))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/grouped", get(products::grouped))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{line_id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
        .route("/total", post(cart::total))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/{id}",
            put(admin::rename_category).delete(admin::delete_category),
        )
        .route(
            "/products",
            post(admin::create_product).layer(DefaultBodyLimit::max(PRODUCT_FORM_LIMIT)),
        )
        .route("/products/{id}", axum::routing::delete(admin::delete_product))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/categories", category_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/admin", admin_routes())
}
