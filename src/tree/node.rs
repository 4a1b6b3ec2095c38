//! Nested subtree payload

use crate::types::CategoryId;
use serde::{Deserialize, Serialize};

/// One category in a nested subtree listing
///
/// A child without children of its own is a `Leaf`; everything else is a
/// `Branch` carrying its own nested listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubtreeNode {
    Leaf {
        id: CategoryId,
        name: String,
        size: Option<u64>,
    },
    Branch {
        id: CategoryId,
        name: String,
        size: Option<u64>,
        children: Vec<SubtreeNode>,
    },
}

impl SubtreeNode {
    pub fn id(&self) -> CategoryId {
        match self {
            SubtreeNode::Leaf { id, .. } | SubtreeNode::Branch { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SubtreeNode::Leaf { name, .. } | SubtreeNode::Branch { name, .. } => name,
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            SubtreeNode::Leaf { size, .. } | SubtreeNode::Branch { size, .. } => *size,
        }
    }

    pub fn children(&self) -> &[SubtreeNode] {
        match self {
            SubtreeNode::Leaf { .. } => &[],
            SubtreeNode::Branch { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SubtreeNode::Leaf { .. })
    }

    /// Nodes in this subtree, self included
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children());
        }
        total
    }
}
