//! Cache types for catalog service responses.

use std::sync::Arc;

use shopfront_core::{CategoryId, CategoryRecord, Product, ProductId};

/// Cache key for categories and products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(CategoryId),
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<CategoryRecord>>),
    Category(Box<CategoryRecord>),
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}
