//! Integration test harness for Shopfront.
//!
//! Each [`TestContext`] starts two servers on ephemeral ports:
//!
//! - a [`FakeCatalog`] that serves the catalog service's REST API from an
//!   in-memory [`CatalogFixture`], and
//! - the real storefront app, configured to talk to that fake.
//!
//! Tests drive the storefront over HTTP with a cookie-keeping client, so
//! cart and tree state carry across requests the way they do in a browser.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_storefront_health() {
//!     let ctx = TestContext::new().await;
//!     let (status, _) = ctx.get("/health").await;
//!     assert_eq!(status, StatusCode::OK);
//! }
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use shopfront_storefront::config::{CatalogConfig, StorefrontConfig};
use shopfront_storefront::state::AppState;
use tokio::net::TcpListener;
use url::Url;

// =============================================================================
// Fixture
// =============================================================================

/// Catalog data and failure switches behind the fake service.
///
/// Records are kept as raw JSON so tests can use the exact shapes the real
/// service sends (string or embedded parent refs, numeric or string prices).
#[derive(Debug, Default)]
pub struct CatalogFixture {
    pub categories: Vec<Value>,
    pub products: Vec<Value>,
    /// When set, every request fails with this status.
    pub fail_with: Option<StatusCode>,
    /// Requests served so far, failures included.
    pub requests: usize,
    next_id: u64,
}

impl CatalogFixture {
    /// A small two-root shop.
    ///
    /// ```text
    /// Nam (men)
    ///   Áo sơ mi (shirts)
    ///     Vải lanh (linen)     <- p-shirt
    ///   Áo thun (tees)         <- p-tee
    /// Nữ (women)
    ///   Váy (dresses)          <- p-dress (out of stock)
    /// (uncategorized)          <- p-mug
    /// ```
    ///
    /// Children are listed before their parents and `tees` uses an embedded
    /// parent reference.
    #[must_use]
    pub fn shop() -> Self {
        Self {
            categories: vec![
                json!({"_id": "shirts", "name": "Áo sơ mi", "parent": "men"}),
                json!({"_id": "men", "name": "Nam", "parent": null}),
                json!({"_id": "tees", "name": "Áo thun", "parent": {"_id": "men", "name": "Nam"}}),
                json!({"_id": "women", "name": "Nữ"}),
                json!({"_id": "dresses", "name": "Váy", "parent": "women"}),
                json!({"_id": "linen", "name": "Vải lanh", "parent": "shirts"}),
            ],
            products: vec![
                json!({
                    "_id": "p-shirt",
                    "name": "Linen shirt",
                    "price": "350000",
                    "image": "/uploads/linen.jpg",
                    "colors": "Trắng, Xanh",
                    "sizes": "M, L",
                    "category": "linen",
                    "status": "Còn hàng",
                    "variants": [
                        {"color": "Trắng", "size": "M", "price": "360000", "stock": 3}
                    ]
                }),
                json!({
                    "_id": "p-tee",
                    "name": "Basic tee",
                    "price": 150_000,
                    "image": "https://cdn.example.com/tee.jpg",
                    "category": {"_id": "tees", "name": "Áo thun"},
                    "status": "Còn hàng"
                }),
                json!({
                    "_id": "p-dress",
                    "name": "Summer dress",
                    "price": "420000",
                    "category": "dresses",
                    "status": "Hết hàng"
                }),
                json!({
                    "_id": "p-mug",
                    "name": "Mug",
                    "price": "50000"
                }),
            ],
            ..Self::default()
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

type SharedFixture = Arc<Mutex<CatalogFixture>>;

fn lock(fixture: &SharedFixture) -> MutexGuard<'_, CatalogFixture> {
    fixture.lock().expect("fixture lock poisoned")
}

fn has_id(record: &Value, id: &str) -> bool {
    record.get("_id").and_then(Value::as_str) == Some(id)
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{what} not found") })),
    )
        .into_response()
}

// =============================================================================
// Fake Catalog Service
// =============================================================================

/// A running fake of the catalog service.
#[derive(Clone)]
pub struct FakeCatalog {
    url: Url,
    fixture: SharedFixture,
}

impl FakeCatalog {
    /// Serve `fixture` on an ephemeral port.
    pub async fn spawn(fixture: CatalogFixture) -> Self {
        let fixture = Arc::new(Mutex::new(fixture));
        let addr = serve(catalog_router(Arc::clone(&fixture))).await;
        let url = Url::parse(&format!("http://{addr}")).expect("valid catalog url");
        Self { url, fixture }
    }

    /// Base URL of the fake service.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Inspect or change the fixture.
    pub fn with_fixture<R>(&self, f: impl FnOnce(&mut CatalogFixture) -> R) -> R {
        f(&mut lock(&self.fixture))
    }

    /// Make every following request fail with `status` (or succeed again).
    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.with_fixture(|fixture| fixture.fail_with = status);
    }

    /// Requests served so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.with_fixture(|fixture| fixture.requests)
    }
}

fn catalog_router(fixture: SharedFixture) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).put(rename_category).delete(delete_category),
        )
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).delete(delete_product),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&fixture),
            count_and_fail,
        ))
        .with_state(fixture)
}

async fn count_and_fail(
    State(fixture): State<SharedFixture>,
    request: Request,
    next: Next,
) -> Response {
    let failure = {
        let mut fixture = lock(&fixture);
        fixture.requests += 1;
        fixture.fail_with
    };

    match failure {
        Some(status) => {
            let mut response =
                (status, Json(json!({ "message": "injected failure" }))).into_response();
            if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("7"));
            }
            response
        }
        None => next.run(request).await,
    }
}

async fn list_categories(State(fixture): State<SharedFixture>) -> Json<Vec<Value>> {
    Json(lock(&fixture).categories.clone())
}

async fn get_category(State(fixture): State<SharedFixture>, Path(id): Path<String>) -> Response {
    lock(&fixture)
        .categories
        .iter()
        .find(|record| has_id(record, &id))
        .map_or_else(|| not_found("Category"), |record| Json(record.clone()).into_response())
}

async fn create_category(State(fixture): State<SharedFixture>, Json(body): Json<Value>) -> Response {
    let mut fixture = lock(&fixture);
    let record = json!({
        "_id": fixture.next_id("cat"),
        "name": body.get("name").cloned().unwrap_or(Value::Null),
        "parent": body.get("parent").cloned().unwrap_or(Value::Null),
    });
    fixture.categories.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn rename_category(
    State(fixture): State<SharedFixture>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut fixture = lock(&fixture);
    let Some(record) = fixture.categories.iter_mut().find(|record| has_id(record, &id)) else {
        return not_found("Category");
    };
    if let (Some(record), Some(name)) = (record.as_object_mut(), body.get("name")) {
        record.insert("name".to_string(), name.clone());
    }
    Json(record.clone()).into_response()
}

async fn delete_category(State(fixture): State<SharedFixture>, Path(id): Path<String>) -> Response {
    let mut fixture = lock(&fixture);
    let before = fixture.categories.len();
    fixture.categories.retain(|record| !has_id(record, &id));
    if fixture.categories.len() == before {
        return not_found("Category");
    }
    Json(json!({ "message": "Category deleted" })).into_response()
}

async fn list_products(State(fixture): State<SharedFixture>) -> Json<Vec<Value>> {
    Json(lock(&fixture).products.clone())
}

async fn get_product(State(fixture): State<SharedFixture>, Path(id): Path<String>) -> Response {
    lock(&fixture)
        .products
        .iter()
        .find(|record| has_id(record, &id))
        .map_or_else(|| not_found("Product"), |record| Json(record.clone()).into_response())
}

/// Store text fields as-is and the image as an `/uploads/...` path.
async fn create_product(State(fixture): State<SharedFixture>, mut multipart: Multipart) -> Response {
    let mut record = serde_json::Map::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            if field.bytes().await.map_or(true, |bytes| bytes.is_empty()) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Image is required" })),
                )
                    .into_response();
            }
            record.insert("image".to_string(), json!(format!("/uploads/{file_name}")));
        } else if let Ok(value) = field.text().await {
            record.insert(name, Value::String(value));
        }
    }

    let mut fixture = lock(&fixture);
    record.insert("_id".to_string(), json!(fixture.next_id("prod")));
    let record = Value::Object(record);
    fixture.products.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn delete_product(State(fixture): State<SharedFixture>, Path(id): Path<String>) -> Response {
    let mut fixture = lock(&fixture);
    let before = fixture.products.len();
    fixture.products.retain(|record| !has_id(record, &id));
    if fixture.products.len() == before {
        return not_found("Product");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server error");
    });
    addr
}

// =============================================================================
// Test Context
// =============================================================================

/// A storefront wired to a fake catalog, plus a shopper's HTTP client.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub catalog: FakeCatalog,
}

impl TestContext {
    /// Storefront over [`CatalogFixture::shop`].
    pub async fn new() -> Self {
        Self::with_fixture(CatalogFixture::shop()).await
    }

    /// Storefront over a custom fixture.
    pub async fn with_fixture(fixture: CatalogFixture) -> Self {
        let catalog = FakeCatalog::spawn(fixture).await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost".to_string(),
            catalog: CatalogConfig::new(catalog.url().clone()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };
        let addr = serve(shopfront_storefront::app(AppState::new(config))).await;

        Self {
            client: shopper(),
            storefront_url: format!("http://{addr}"),
            catalog,
        }
    }

    /// A second shopper with their own session.
    #[must_use]
    pub fn new_shopper(&self) -> Client {
        shopper()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// `GET` as the default shopper.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send_as(&self.client, Method::GET, path, None).await
    }

    /// Send a request with an optional JSON body as the default shopper.
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.client, method, path, body).await
    }

    /// Send a request as `client`.
    ///
    /// Empty bodies come back as `Value::Null`, non-JSON bodies as a string.
    pub async fn send_as(
        &self,
        client: &Client,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("storefront request");
        let status = response.status();
        let text = response.text().await.expect("response body");
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, value)
    }
}

fn shopper() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
