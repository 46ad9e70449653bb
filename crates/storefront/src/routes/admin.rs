//! Catalog administration handlers.
//!
//! Validates input, forwards the write to the catalog service, and relies on
//! the client to drop stale cache entries.

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Deserialize;
use shopfront_core::{CategoryId, CategoryRecord, Product, ProductId, deserialize_category_ref};
use tracing::instrument;

use crate::catalog::forms::NewProductBuilder;
use crate::catalog::{CategoryRename, NewCategory, ProductImage};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Either a bare id or an embedded category object.
    #[serde(default, deserialize_with = "deserialize_category_ref")]
    pub parent: Option<CategoryId>,
}

/// Request body for renaming a category.
#[derive(Debug, Deserialize)]
pub struct RenameCategoryRequest {
    pub name: String,
}

/// Create a category.
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Option<CategoryRecord>>)> {
    let category = NewCategory::new(&request.name, request.parent)?;
    let created = state.catalog().create_category(&category).await?;
    tracing::info!(name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename a category.
#[instrument(skip(state))]
pub async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(request): Json<RenameCategoryRequest>,
) -> Result<Json<Option<CategoryRecord>>> {
    let rename = CategoryRename::new(&request.name)?;
    let updated = state.catalog().rename_category(&id, &rename).await?;
    Ok(Json(updated))
}

/// Delete a category.
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    state.catalog().delete_category(&id).await?;
    tracing::info!(%id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Create a product from a multipart form with an `image` file field.
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Option<Product>>)> {
    let mut builder = NewProductBuilder::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            // Browsers send an empty part when no file was chosen.
            if !bytes.is_empty() {
                builder.image(ProductImage::new(file_name, content_type, bytes.to_vec())?);
            }
        } else {
            let value = field.text().await.map_err(bad_multipart)?;
            builder.text(&name, value)?;
        }
    }

    let product = builder.build()?;
    let created = state.catalog().create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.catalog().delete_product(&id).await?;
    tracing::info!(%id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}
