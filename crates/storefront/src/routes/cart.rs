//! Cart route handlers.
//!
//! The cart is stored in the session (see [`SessionCart`]). Lines are
//! addressed by their stable line id, so a client holding an older view of
//! the cart never edits the wrong line.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shopfront_core::cart::{CartVariant, Outcome};
use shopfront_core::{LineId, Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::CartView;
use crate::services::{RequestCartStore, SessionCart, line_item_for};
use crate::state::AppState;

/// Request body for adding one unit of a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<CartVariant>,
}

/// Request body for changing a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub delta: i64,
}

/// Request body for totalling selected lines.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRequest {
    #[serde(default)]
    pub line_ids: Vec<LineId>,
}

/// Result of a cart mutation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
    pub cart: CartView,
}

/// Total of the selected lines.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: Price,
}

/// Number of units in the cart.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = SessionCart::load(session).await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Number of units in the cart, for a header badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CountResponse>> {
    let cart = SessionCart::load(session).await?;
    Ok(Json(CountResponse {
        count: cart.cart().item_count(),
    }))
}

/// Add one unit of a product, merging into an existing line for the same
/// product and variant.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartMutation>> {
    let product = state.catalog().get_product(&request.product_id).await?;
    let item = line_item_for(&product, request.variant, state.image_base_url())?;

    let mut cart = SessionCart::load(session).await?;
    let line_id = cart.add_item(item).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product.id.as_str())]),
    );

    Ok(Json(CartMutation {
        outcome: Outcome::Applied,
        line_id: Some(line_id),
        cart: CartView::from(cart.cart()),
    }))
}

/// Change a line's quantity by `delta`.
///
/// A change that would leave the line at zero or below is rejected and the
/// cart is returned unchanged.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(line_id): Path<LineId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartMutation>> {
    let mut cart = SessionCart::load(session).await?;
    let outcome = cart
        .apply(|store| store.update_quantity(&line_id, request.delta))
        .await?;

    Ok(Json(CartMutation {
        outcome,
        line_id: Some(line_id),
        cart: CartView::from(cart.cart()),
    }))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Path(line_id): Path<LineId>,
) -> Result<Json<CartMutation>> {
    let mut cart = SessionCart::load(session).await?;
    let outcome = cart.apply(|store| store.remove_item(&line_id)).await?;

    Ok(Json(CartMutation {
        outcome,
        line_id: None,
        cart: CartView::from(cart.cart()),
    }))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartMutation>> {
    let mut cart = SessionCart::load(session).await?;
    let outcome = cart.apply(RequestCartStore::clear).await?;

    Ok(Json(CartMutation {
        outcome,
        line_id: None,
        cart: CartView::from(cart.cart()),
    }))
}

/// Total of the selected lines. Unknown ids contribute nothing.
#[instrument(skip(session))]
pub async fn total(
    session: Session,
    Json(request): Json<TotalRequest>,
) -> Result<Json<TotalResponse>> {
    let cart = SessionCart::load(session).await?;
    Ok(Json(TotalResponse {
        total: cart.cart().total_price(&request.line_ids),
    }))
}
