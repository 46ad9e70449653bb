//! JSON response bodies.
//!
//! Catalog records are flattened into these views with the fields a client
//! would otherwise have to derive itself (resolved image URLs, category
//! names, line totals).

use serde::Serialize;
use shopfront_core::cart::{Cart, CartLineItem};
use shopfront_core::tree::{CategoryNode, ExpansionState, category_path};
use shopfront_core::{CategoryId, CategoryRecord, Price, Product};

/// A product in a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
}

impl ProductSummary {
    #[must_use]
    pub fn new(product: Product, image_base: &str, category_name: Option<&str>) -> Self {
        Self {
            image_url: product.image_url(image_base),
            category_name: category_name.map(str::to_owned),
            product,
        }
    }
}

/// A single product with everything the detail view needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    pub color_options: Vec<String>,
    pub size_options: Vec<String>,
    pub display_price: Option<Price>,
    pub available: bool,
}

impl ProductDetail {
    #[must_use]
    pub fn new(product: Product, image_base: &str, category_name: Option<String>) -> Self {
        Self {
            image_url: product.image_url(image_base),
            category_name,
            color_options: product.color_options().into_iter().map(str::to_owned).collect(),
            size_options: product.size_options().into_iter().map(str::to_owned).collect(),
            display_price: product.display_price(None),
            available: product.status.is_available(),
            product,
        }
    }
}

/// A category subtree plus its breadcrumb path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub node: CategoryNode,
    pub display_path: Option<String>,
}

impl CategoryDetail {
    #[must_use]
    pub fn new(node: CategoryNode, records: &[CategoryRecord]) -> Self {
        Self {
            display_path: category_path(records, node.id()),
            node,
        }
    }
}

/// One visible row of an interactive category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

impl CategoryRow {
    /// Rows visible under `expansion`.
    #[must_use]
    pub fn visible(tree: &[CategoryNode], expansion: &ExpansionState) -> Vec<Self> {
        expansion
            .visible_rows(tree)
            .into_iter()
            .map(|(node, depth)| Self {
                id: node.id().clone(),
                name: node.name().to_owned(),
                depth,
                has_children: node.has_children(),
                expanded: expansion.is_expanded(node.id()),
            })
            .collect()
    }
}

/// A cart line with its computed total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLineItem,
    pub line_total: Price,
}

/// The whole cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Price,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    line_total: line.line_total(),
                    line: line.clone(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }
}
