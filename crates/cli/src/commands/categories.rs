//! Category commands.

use shopfront_core::CategoryId;
use shopfront_core::tree::{
    CategoryNode, ExpansionState, build_tree, category_path, find_by_id,
    render_indented_options,
};
use shopfront_storefront::catalog::{CategoryRename, NewCategory};
use tracing::info;

use super::{CliError, Context, emit};

/// Print the tree, fully expanded unless `collapsed`.
pub async fn tree(ctx: &Context, collapsed: bool) -> Result<(), CliError> {
    let tree = ctx.catalog()?.category_tree().await?;
    if tree.is_empty() {
        return emit("No categories");
    }

    let expansion = if collapsed {
        ExpansionState::new()
    } else {
        ExpansionState::expanded_all(&tree)
    };

    for (node, depth) in expansion.visible_rows(&tree) {
        emit(tree_row(node, depth, expansion.is_expanded(node.id())))?;
    }
    Ok(())
}

/// Print indented options with their ids.
pub async fn options(ctx: &Context) -> Result<(), CliError> {
    let tree = ctx.catalog()?.category_tree().await?;
    for option in render_indented_options(&tree, 0) {
        emit(format_args!("{}\t{}", option.id, option.label))?;
    }
    Ok(())
}

/// Print the display path of a category.
pub async fn path(ctx: &Context, id: CategoryId) -> Result<(), CliError> {
    let records = ctx.catalog()?.list_categories().await?;
    let path = category_path(&records, &id)
        .ok_or_else(|| CliError::NotFound(format!("category {id}")))?;
    emit(path)
}

/// Create a category.
pub async fn add(ctx: &Context, name: &str, parent: Option<CategoryId>) -> Result<(), CliError> {
    let category = NewCategory::new(name, parent)?;
    let catalog = ctx.catalog()?;

    if let Some(parent) = &category.parent {
        let tree = build_tree(&catalog.list_categories().await?, None);
        if find_by_id(&tree, parent).is_none() {
            return Err(CliError::NotFound(format!("parent category {parent}")));
        }
    }

    match catalog.create_category(&category).await? {
        Some(created) => emit(format_args!("Created category {} ({})", created.name, created.id)),
        None => emit(format_args!("Created category {}", category.name)),
    }
}

/// Rename a category.
pub async fn rename(ctx: &Context, id: CategoryId, name: &str) -> Result<(), CliError> {
    let rename = CategoryRename::new(name)?;
    ctx.catalog()?.rename_category(&id, &rename).await?;
    info!(%id, name = %rename.name, "Category renamed");
    emit(format_args!("Renamed {id} to {}", rename.name))
}

/// Delete a category.
pub async fn delete(ctx: &Context, id: CategoryId) -> Result<(), CliError> {
    ctx.catalog()?.delete_category(&id).await?;
    info!(%id, "Category deleted");
    emit(format_args!("Deleted category {id}"))
}

/// One line of the tree view: indentation, an expand marker, name and id.
fn tree_row(node: &CategoryNode, depth: usize, expanded: bool) -> String {
    let marker = match (node.has_children(), expanded) {
        (false, _) => "•",
        (true, true) => "▾",
        (true, false) => "▸",
    };
    format!("{}{marker} {} ({})", "  ".repeat(depth), node.name(), node.id())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::CategoryRecord;

    use super::*;

    #[test]
    fn test_tree_rows() {
        let records = vec![
            CategoryRecord::new("men", "Men", None),
            CategoryRecord::new("shirts", "Shirts", Some(CategoryId::new("men"))),
        ];
        let tree = build_tree(&records, None);
        let men = tree.first().unwrap();
        let shirts = men.children.first().unwrap();

        assert_eq!(tree_row(men, 0, true), "▾ Men (men)");
        assert_eq!(tree_row(men, 0, false), "▸ Men (men)");
        assert_eq!(tree_row(shirts, 1, false), "  • Shirts (shirts)");
    }
}
