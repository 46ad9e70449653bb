//! Grouping products by category.
//!
//! Products reference a single category id. Listing a parent category also
//! lists products filed under any of its descendants.

use serde::Serialize;

use crate::tree::{CategoryNode, collect_descendant_ids, find_by_id};
use crate::types::{CategoryId, Product};

/// Display name used for products without a category.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// Products shown together under one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductGroup {
    /// The heading category; `None` for the uncategorized group.
    pub category: Option<CategoryId>,
    pub name: String,
    pub products: Vec<Product>,
}

/// Products filed under `category_id` or any of its descendants.
///
/// Returns an empty list when the category is not in the tree.
#[must_use]
pub fn products_in_category<'a>(
    tree: &[CategoryNode],
    products: &'a [Product],
    category_id: &CategoryId,
) -> Vec<&'a Product> {
    let Some(node) = find_by_id(tree, category_id) else {
        return Vec::new();
    };
    let ids = collect_descendant_ids(node);
    products
        .iter()
        .filter(|product| product.category.as_ref().is_some_and(|id| ids.contains(id)))
        .collect()
}

/// Products that have no category.
#[must_use]
pub fn uncategorized(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|product| product.category.is_none())
        .collect()
}

/// One group per root category, then one for uncategorized products.
///
/// Groups appear in tree order. Empty groups are left out. Products filed
/// under a category that is not in the tree appear in no group.
#[must_use]
pub fn group_by_root(tree: &[CategoryNode], products: &[Product]) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = tree
        .iter()
        .filter_map(|root| group_for_category(tree, products, root.id()))
        .collect();

    let loose = uncategorized(products);
    if !loose.is_empty() {
        groups.push(ProductGroup {
            category: None,
            name: UNCATEGORIZED_NAME.to_owned(),
            products: loose.into_iter().cloned().collect(),
        });
    }

    groups
}

/// The group for a single selected category, if it has any products.
#[must_use]
pub fn group_for_category(
    tree: &[CategoryNode],
    products: &[Product],
    category_id: &CategoryId,
) -> Option<ProductGroup> {
    let node = find_by_id(tree, category_id)?;
    let matching = products_in_category(tree, products, category_id);
    if matching.is_empty() {
        return None;
    }
    Some(ProductGroup {
        category: Some(node.id().clone()),
        name: node.name().to_owned(),
        products: matching.into_iter().cloned().collect(),
    })
}

/// Name of a category anywhere in the tree.
#[must_use]
pub fn category_name<'a>(tree: &'a [CategoryNode], id: &CategoryId) -> Option<&'a str> {
    find_by_id(tree, id).map(CategoryNode::name)
}
