//! Expand/collapse state for interactive category trees.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{CategoryNode, expandable_ids};
use crate::types::CategoryId;

/// Set of expanded category ids.
///
/// Owned by whichever view renders the tree. Ids that no longer exist in a
/// rebuilt tree are harmless and simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: HashSet<CategoryId>,
}

impl ExpansionState {
    /// Everything collapsed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every node with children expanded.
    #[must_use]
    pub fn expanded_all(nodes: &[CategoryNode]) -> Self {
        Self {
            expanded: expandable_ids(nodes),
        }
    }

    /// Whether `id` is expanded.
    #[must_use]
    pub fn is_expanded(&self, id: &CategoryId) -> bool {
        self.expanded.contains(id)
    }

    /// Flip the state of `id`. Returns the new state.
    pub fn toggle(&mut self, id: &CategoryId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    /// Expand every node with children, keeping existing expansions.
    pub fn expand_all(&mut self, nodes: &[CategoryNode]) {
        self.expanded.extend(expandable_ids(nodes));
    }

    /// Collapse everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Rows to display: each node paired with its depth, skipping the
    /// children of collapsed nodes.
    #[must_use]
    pub fn visible_rows<'a>(&self, nodes: &'a [CategoryNode]) -> Vec<(&'a CategoryNode, usize)> {
        let mut rows = Vec::new();
        self.collect_rows(nodes, 0, &mut rows);
        rows
    }

    fn collect_rows<'a>(
        &self,
        nodes: &'a [CategoryNode],
        depth: usize,
        rows: &mut Vec<(&'a CategoryNode, usize)>,
    ) {
        for node in nodes {
            rows.push((node, depth));
            if node.has_children() && self.is_expanded(node.id()) {
                self.collect_rows(&node.children, depth + 1, rows);
            }
        }
    }
}
