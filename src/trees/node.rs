use serde::{Deserialize, Serialize};

/// Decision tree node
///
/// A decision node routes samples with `x[feature_index] <= threshold` to
/// `left` and the rest to `right`. A leaf predicts the mean target of the
/// training samples that reached it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TreeNode<T> {
    Leaf {
        value: T,
    },
    Decision {
        feature_index: usize,
        threshold: T,
        /// Score that justified the split, always strictly positive.
        variance_reduction: f64,
        left: Box<TreeNode<T>>,
        right: Box<TreeNode<T>>,
    },
}

impl<T> TreeNode<T> {
    pub fn leaf(value: T) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Length of the longest root-to-leaf path; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Decision { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Decision { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Decision { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}
