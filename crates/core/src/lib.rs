//! Shopfront Core - Catalog types, category trees, and the shopping cart.
//!
//! This crate provides the logic shared by all Shopfront components:
//! - `storefront` - JSON storefront server in front of the catalog service
//! - `cli` - Command-line tools for catalog administration and a local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no network, no
//! files, no async runtime. Cart persistence goes through the
//! [`cart::CartRepository`] trait so each caller picks its own backing store.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, category and product records
//! - [`tree`] - Flat category list to nested tree, plus traversal helpers
//! - [`catalog`] - Grouping products under category subtrees
//! - [`cart`] - Cart aggregate, merge rule, and persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod tree;
pub mod types;

pub use types::*;
