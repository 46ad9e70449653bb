//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for catalog domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use category::{CategoryRecord, CategoryRef, deserialize_category_ref};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductVariant};
pub use status::ProductStatus;
