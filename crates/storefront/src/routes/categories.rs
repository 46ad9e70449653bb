//! Category route handlers.
//!
//! The tree is rebuilt from the flat catalog list on every request; the
//! catalog client caches the list itself. Expand/collapse state for the
//! interactive tree lives in the session and defaults to fully expanded.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shopfront_core::CategoryId;
use shopfront_core::tree::{
    CategoryNode, ExpansionState, IndentedOption, build_tree, find_by_id,
    render_indented_options,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{CategoryDetail, CategoryRow, session_keys};
use crate::state::AppState;

/// Response for a toggled row.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: CategoryId,
    pub expanded: bool,
}

/// Nested category tree.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CategoryNode>>> {
    Ok(Json(state.catalog().category_tree().await?))
}

/// Indented options for a parent-category dropdown.
#[instrument(skip(state))]
pub async fn options(State(state): State<AppState>) -> Result<Json<Vec<IndentedOption>>> {
    let tree = state.catalog().category_tree().await?;
    Ok(Json(render_indented_options(&tree, 0)))
}

/// A single category with its subtree.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryDetail>> {
    let records = state.catalog().list_categories().await?;
    let tree = build_tree(&records, None);

    let node = find_by_id(&tree, &id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(Json(CategoryDetail::new(node, &records)))
}

/// Rows of the interactive tree visible under the session's expansion state.
#[instrument(skip(state, session))]
pub async fn rows(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CategoryRow>>> {
    let tree = state.catalog().category_tree().await?;
    let expansion = load_expansion(&session, &tree).await?;
    Ok(Json(CategoryRow::visible(&tree, &expansion)))
}

/// Flip one row between expanded and collapsed.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Json<ToggleResponse>> {
    let tree = state.catalog().category_tree().await?;
    if find_by_id(&tree, &id).is_none() {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    let mut expansion = load_expansion(&session, &tree).await?;
    let expanded = expansion.toggle(&id);
    save_expansion(&session, &expansion).await?;

    Ok(Json(ToggleResponse { id, expanded }))
}

/// Expand every row that has children.
#[instrument(skip(state, session))]
pub async fn expand_all(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CategoryRow>>> {
    let tree = state.catalog().category_tree().await?;
    let mut expansion = load_expansion(&session, &tree).await?;
    expansion.expand_all(&tree);
    save_expansion(&session, &expansion).await?;
    Ok(Json(CategoryRow::visible(&tree, &expansion)))
}

/// Collapse every row.
#[instrument(skip(state, session))]
pub async fn collapse_all(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CategoryRow>>> {
    let tree = state.catalog().category_tree().await?;
    let mut expansion = load_expansion(&session, &tree).await?;
    expansion.collapse_all();
    save_expansion(&session, &expansion).await?;
    Ok(Json(CategoryRow::visible(&tree, &expansion)))
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_expansion(session: &Session, tree: &[CategoryNode]) -> Result<ExpansionState> {
    Ok(session
        .get::<ExpansionState>(session_keys::CATEGORY_EXPANSION)
        .await?
        .unwrap_or_else(|| ExpansionState::expanded_all(tree)))
}

async fn save_expansion(session: &Session, expansion: &ExpansionState) -> Result<()> {
    session
        .insert(session_keys::CATEGORY_EXPANSION, expansion)
        .await?;
    Ok(())
}
