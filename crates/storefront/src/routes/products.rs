//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shopfront_core::catalog::{
    ProductGroup, category_name, group_by_root, group_for_category, products_in_category,
};
use shopfront_core::tree::build_tree;
use shopfront_core::{CategoryId, Product, ProductId};
use tracing::instrument;

use crate::catalog::CatalogError;
use crate::error::Result;
use crate::models::{ProductDetail, ProductSummary};
use crate::state::AppState;

/// Query parameters for product listings.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Restrict to this category and its descendants.
    pub category: Option<CategoryId>,
}

impl ProductQuery {
    fn category(&self) -> Option<&CategoryId> {
        self.category
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }
}

/// Products, optionally restricted to a category subtree.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let (records, products) = tokio::try_join!(
        state.catalog().list_categories(),
        state.catalog().list_products()
    )?;
    let tree = build_tree(&records, None);

    let selected: Vec<&Product> = match query.category() {
        Some(id) => products_in_category(&tree, &products, id),
        None => products.iter().collect(),
    };

    let image_base = state.image_base_url();
    Ok(Json(
        selected
            .into_iter()
            .map(|product| {
                let name = product
                    .category
                    .as_ref()
                    .and_then(|id| category_name(&tree, id));
                ProductSummary::new(product.clone(), image_base, name)
            })
            .collect(),
    ))
}

/// Products grouped under their root category, uncategorized last.
///
/// With `?category=` only that category's group is returned.
#[instrument(skip(state))]
pub async fn grouped(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductGroup>>> {
    let (records, products) = tokio::try_join!(
        state.catalog().list_categories(),
        state.catalog().list_products()
    )?;
    let tree = build_tree(&records, None);

    let groups = match query.category() {
        Some(id) => group_for_category(&tree, &products, id)
            .into_iter()
            .collect(),
        None => group_by_root(&tree, &products),
    };

    Ok(Json(groups))
}

/// A single product with its category name.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state.catalog().get_product(&id).await?;

    let category_name = match &product.category {
        Some(category_id) => match state.catalog().get_category(category_id).await {
            Ok(category) => Some(category.name),
            Err(CatalogError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    Ok(Json(ProductDetail::new(
        product,
        state.image_base_url(),
        category_name,
    )))
}
