//! Category tree construction and traversal.
//!
//! The catalog service returns categories as a flat list where each record
//! points at its parent. Every consumer (home page sections, admin manager,
//! product form dropdown, tree selector) works on the nested form built here.
//!
//! # Example
//!
//! ```rust
//! use shopfront_core::tree::{build_tree, render_indented_options};
//! use shopfront_core::{CategoryId, CategoryRecord};
//!
//! let records = vec![
//!     CategoryRecord::new("shirts", "Shirts", Some(CategoryId::new("men"))),
//!     CategoryRecord::new("men", "Men", None),
//! ];
//!
//! let tree = build_tree(&records, None);
//! assert_eq!(tree.len(), 1);
//! assert_eq!(tree[0].children[0].record.name, "Shirts");
//!
//! let labels: Vec<_> = render_indented_options(&tree, 0)
//!     .into_iter()
//!     .map(|option| option.label)
//!     .collect();
//! assert_eq!(labels, vec!["Men", "— Shirts"]);
//! ```

pub mod expansion;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, CategoryRecord};

pub use expansion::ExpansionState;

/// Prefix repeated once per depth level in dropdown labels.
pub const INDENT_MARKER: &str = "— ";

/// Separator between ancestor names in a category path.
pub const PATH_SEPARATOR: &str = " / ";

/// A category with its nested children.
///
/// Trees are rebuilt from the flat records whenever the source data changes;
/// nodes are never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub record: CategoryRecord,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// The category id.
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        &self.record.id
    }

    /// The category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Whether the node has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A dropdown entry derived from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentedOption {
    pub id: CategoryId,
    /// Name prefixed with one [`INDENT_MARKER`] per level.
    pub label: String,
    pub depth: usize,
}

/// Build the nested tree below `root_parent_id`.
///
/// `None` selects root records (no parent). Children keep the relative
/// order they have in `records`. Records whose parent id matches no record
/// are never reached and do not appear in the result.
#[must_use]
pub fn build_tree<'a>(
    records: &'a [CategoryRecord],
    root_parent_id: Option<&'a CategoryId>,
) -> Vec<CategoryNode> {
    let mut ancestry: Vec<&'a CategoryId> = root_parent_id.into_iter().collect();
    build_level(records, root_parent_id, &mut ancestry)
}

fn build_level<'a>(
    records: &'a [CategoryRecord],
    parent: Option<&'a CategoryId>,
    ancestry: &mut Vec<&'a CategoryId>,
) -> Vec<CategoryNode> {
    let mut level = Vec::new();
    for record in records.iter().filter(|record| record.parent.as_ref() == parent) {
        // A record already on the current path means the parent chain loops.
        if ancestry.contains(&&record.id) {
            continue;
        }
        ancestry.push(&record.id);
        let children = build_level(records, Some(&record.id), ancestry);
        ancestry.pop();
        level.push(CategoryNode {
            record: record.clone(),
            children,
        });
    }
    level
}

/// Pre-order traversal: each node followed by its flattened children.
#[must_use]
pub fn flatten(nodes: &[CategoryNode]) -> Vec<&CategoryNode> {
    let mut out = Vec::new();
    flatten_into(nodes, &mut out);
    out
}

fn flatten_into<'a>(nodes: &'a [CategoryNode], out: &mut Vec<&'a CategoryNode>) {
    for node in nodes {
        out.push(node);
        flatten_into(&node.children, out);
    }
}

/// Find a node anywhere in the tree.
#[must_use]
pub fn find_by_id<'a>(nodes: &'a [CategoryNode], id: &CategoryId) -> Option<&'a CategoryNode> {
    nodes.iter().find_map(|node| {
        if node.id() == id {
            Some(node)
        } else {
            find_by_id(&node.children, id)
        }
    })
}

/// The node's own id plus the ids of all its descendants.
#[must_use]
pub fn collect_descendant_ids(node: &CategoryNode) -> HashSet<CategoryId> {
    let mut ids = HashSet::new();
    collect_into(node, &mut ids);
    ids
}

fn collect_into(node: &CategoryNode, ids: &mut HashSet<CategoryId>) {
    ids.insert(node.id().clone());
    for child in &node.children {
        collect_into(child, ids);
    }
}

/// Flatten the tree into dropdown entries, indenting each name by depth.
#[must_use]
pub fn render_indented_options(nodes: &[CategoryNode], level: usize) -> Vec<IndentedOption> {
    nodes
        .iter()
        .flat_map(|node| {
            let own = IndentedOption {
                id: node.id().clone(),
                label: format!("{}{}", INDENT_MARKER.repeat(level), node.name()),
                depth: level,
            };
            std::iter::once(own).chain(render_indented_options(&node.children, level + 1))
        })
        .collect()
}

/// Ids of every node that has at least one child.
///
/// The admin category manager expands all of these after each reload.
#[must_use]
pub fn expandable_ids(nodes: &[CategoryNode]) -> HashSet<CategoryId> {
    flatten(nodes)
        .into_iter()
        .filter(|node| node.has_children())
        .map(|node| node.id().clone())
        .collect()
}

/// Human-readable path such as `"Men / Shirts"` for a category.
///
/// A path precomputed by the catalog service takes precedence. Returns
/// `None` if `id` is unknown. Walking stops at a missing parent.
#[must_use]
pub fn category_path(records: &[CategoryRecord], id: &CategoryId) -> Option<String> {
    let by_id: HashMap<&CategoryId, &CategoryRecord> =
        records.iter().map(|record| (&record.id, record)).collect();

    let start = by_id.get(id)?;
    if let Some(path) = start.path.as_deref().filter(|path| !path.is_empty()) {
        return Some(path.to_owned());
    }

    let mut names = vec![start.name.as_str()];
    let mut seen = HashSet::from([&start.id]);
    let mut current = start.parent.as_ref();
    while let Some(parent_id) = current {
        let Some(parent) = by_id.get(parent_id) else {
            break;
        };
        if !seen.insert(&parent.id) {
            break;
        }
        names.push(parent.name.as_str());
        current = parent.parent.as_ref();
    }

    names.reverse();
    Some(names.join(PATH_SEPARATOR))
}
