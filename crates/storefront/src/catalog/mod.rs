//! Catalog service client.
//!
//! The catalog service owns categories and products and is the source of
//! truth; the storefront keeps no copy beyond a short-lived `moka` cache.
//!
//! # Endpoints
//!
//! - `GET/POST /api/categories`, `GET/PUT/DELETE /api/categories/{id}`
//! - `GET/POST /api/products`, `GET/DELETE /api/products/{id}`
//!
//! Product creation is a multipart upload carrying the image. Every write
//! drops the affected cache entries so the next read sees the change.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog);
//! let tree = client.category_tree().await?;
//! let product = client.get_product(&ProductId::new("65f0")).await?;
//! ```

mod cache;
pub mod forms;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shopfront_core::tree::{CategoryNode, build_tree};
use shopfront_core::{CategoryId, CategoryRecord, Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;

pub use cache::{CacheKey, CacheValue};
pub use forms::{CategoryRename, FormError, NewCategory, NewProduct, ProductImage};

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success response; `message` comes from the body when present.
    #[error("Catalog service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured base URL cannot carry a path.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether the catalog service rejected the request as invalid input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog service REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// Base URL of the catalog service.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `{base}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token, if one is configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.inner.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String, CatalogError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited(retry_after(&response)));
        }

        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: error_message(&response_text)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        Ok(response_text)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, CatalogError> {
        let body = self.send(self.inner.client.get(url), what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Fetch every category as a flat list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<CategoryRecord>>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["categories"])?;
        let categories: Arc<Vec<CategoryRecord>> =
            Arc::new(self.get_json(url, "categories").await?);

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    /// Fetch every category and assemble the nested tree from the roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the category list cannot be fetched.
    pub async fn category_tree(&self) -> Result<Vec<CategoryNode>, CatalogError> {
        let categories = self.list_categories().await?;
        Ok(build_tree(&categories, None))
    }

    /// Fetch a single category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<CategoryRecord, CatalogError> {
        let cache_key = CacheKey::Category(id.clone());
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let url = self.endpoint(&["categories", id.as_str()])?;
        let category: CategoryRecord = self.get_json(url, &format!("category {id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Create a category.
    ///
    /// Returns the created record when the service echoes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    #[instrument(skip(self), fields(name = %category.name))]
    pub async fn create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Option<CategoryRecord>, CatalogError> {
        let url = self.endpoint(&["categories"])?;
        let request = self.authorize(self.inner.client.post(url).json(category));
        let body = self.send(request, "categories").await?;

        self.invalidate_categories(None).await;
        Ok(parse_echo(&body))
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn rename_category(
        &self,
        id: &CategoryId,
        rename: &CategoryRename,
    ) -> Result<Option<CategoryRecord>, CatalogError> {
        let url = self.endpoint(&["categories", id.as_str()])?;
        let request = self.authorize(self.inner.client.put(url).json(rename));
        let body = self.send(request, &format!("category {id}")).await?;

        self.invalidate_categories(Some(id)).await;
        Ok(parse_echo(&body))
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), CatalogError> {
        let url = self.endpoint(&["categories", id.as_str()])?;
        let request = self.authorize(self.inner.client.delete(url));
        self.send(request, &format!("category {id}")).await?;

        self.invalidate_categories(Some(id)).await;
        Ok(())
    }

    async fn invalidate_categories(&self, id: Option<&CategoryId>) {
        self.inner.cache.invalidate(&CacheKey::Categories).await;
        if let Some(id) = id {
            self.inner
                .cache
                .invalidate(&CacheKey::Category(id.clone()))
                .await;
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint(&["products"])?;
        let products: Arc<Vec<Product>> = Arc::new(self.get_json(url, "products").await?);

        self.inner
            .cache
            .insert(
                CacheKey::Products,
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;

        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = self.get_json(url, &format!("product {id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product, uploading its image.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the upload.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<Option<Product>, CatalogError> {
        let url = self.endpoint(&["products"])?;
        let form = product.into_multipart()?;
        let request = self.authorize(self.inner.client.post(url).multipart(form));
        let body = self.send(request, "products").await?;

        self.inner.cache.invalidate(&CacheKey::Products).await;
        Ok(parse_echo(&body))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        let request = self.authorize(self.inner.client.delete(url));
        self.send(request, &format!("product {id}")).await?;

        self.inner.cache.invalidate(&CacheKey::Products).await;
        self.inner
            .cache
            .invalidate(&CacheKey::Product(id.clone()))
            .await;
        Ok(())
    }

    /// Check that the catalog service answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        let url = self.endpoint(&["categories"])?;
        self.send(self.inner.client.get(url), "categories").await?;
        Ok(())
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1)
}

/// Pull `message` out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
}

/// Write endpoints may or may not echo the stored record.
fn parse_echo<T: DeserializeOwned>(body: &str) -> Option<T> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Write response did not contain a record");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig::new(Url::parse(base).unwrap()))
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://localhost:5001");
        assert_eq!(
            client.endpoint(&["categories"]).unwrap().as_str(),
            "http://localhost:5001/api/categories"
        );
        assert_eq!(
            client.endpoint(&["products", "65f0"]).unwrap().as_str(),
            "http://localhost:5001/api/products/65f0"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_ids() {
        let client = client("https://shop.example.vn/catalog/");
        assert_eq!(
            client.endpoint(&["categories", "a/b"]).unwrap().as_str(),
            "https://shop.example.vn/catalog/api/categories/a%2Fb"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Category name already exists"}"#),
            Some("Category name already exists".to_string())
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn test_parse_echo_tolerates_non_records() {
        let record: Option<CategoryRecord> = parse_echo(r#"{"_id":"men","name":"Men"}"#);
        assert_eq!(record.unwrap().name, "Men");

        let empty: Option<CategoryRecord> = parse_echo("");
        assert!(empty.is_none());

        let ack: Option<CategoryRecord> = parse_echo(r#"{"ok":true}"#);
        assert!(ack.is_none());
    }

    #[test]
    fn test_is_client_error() {
        let rejected = CatalogError::Status {
            status: 400,
            message: "bad".to_string(),
        };
        let broken = CatalogError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(rejected.is_client_error());
        assert!(!broken.is_client_error());
        assert!(!CatalogError::RateLimited(3).is_client_error());
    }

    #[tokio::test]
    async fn test_cached_categories_skip_network() {
        // Nothing listens on port 9; a cache miss would fail.
        let client = client("http://127.0.0.1:9");
        let records = Arc::new(vec![CategoryRecord::new("men", "Men", None)]);
        client
            .inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(Arc::clone(&records)))
            .await;

        let tree = client.category_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.first().unwrap().name(), "Men");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let client = client("http://127.0.0.1:9");
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
