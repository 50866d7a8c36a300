//! Read-only views of a fitted tree: an indented text dump and a node/edge
//! graph that an external renderer such as Graphviz can draw.
use super::node::TreeNode;
use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::Path;

impl<T: Display> TreeNode<T> {
    fn write_text(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        match self {
            TreeNode::Leaf { value } => writeln!(f, "{value}"),
            TreeNode::Decision {
                feature_index,
                threshold,
                variance_reduction,
                left,
                right,
            } => {
                writeln!(f, "X_{feature_index} <= {threshold} ? {variance_reduction}")?;
                let child_indent = indent.repeat(2);
                write!(f, "{indent}left:")?;
                left.write_text(f, &child_indent)?;
                write!(f, "{indent}right:")?;
                right.write_text(f, &child_indent)
            }
        }
    }
}

/// Pre-order dump: decision nodes as `X_i <= threshold ? reduction`, leaves as
/// their value, children prefixed with `left:`/`right:` and an indent that
/// doubles per level. Numbers print in full precision.
impl<T: Display> Display for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, " ")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    /// `feature <= threshold`
    Yes,
    No,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GraphNodeKind<T> {
    Leaf {
        value: T,
    },
    Decision {
        feature_index: usize,
        threshold: T,
        variance_reduction: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode<T> {
    pub id: usize,
    /// Display text; thresholds are rounded to two decimals here only.
    pub label: String,
    pub kind: GraphNodeKind<T>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub branch: Branch,
}

/// Directed graph of a tree. Node ids follow pre-order, so the root is 0 and
/// every edge points to a larger id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeGraph<T> {
    pub nodes: Vec<GraphNode<T>>,
    pub edges: Vec<GraphEdge>,
}

impl<T: Copy + Display> TreeGraph<T> {
    pub fn from_node(root: &TreeNode<T>) -> Self {
        let mut graph = Self {
            nodes: Vec::with_capacity(root.node_count()),
            edges: Vec::new(),
        };
        graph.collect(root);
        graph
    }

    fn collect(&mut self, node: &TreeNode<T>) -> usize {
        let id = self.nodes.len();
        match node {
            TreeNode::Leaf { value } => self.nodes.push(GraphNode {
                id,
                label: value.to_string(),
                kind: GraphNodeKind::Leaf { value: *value },
            }),
            TreeNode::Decision {
                feature_index,
                threshold,
                variance_reduction,
                left,
                right,
            } => {
                self.nodes.push(GraphNode {
                    id,
                    label: format!("X{feature_index} <= {threshold:.2}"),
                    kind: GraphNodeKind::Decision {
                        feature_index: *feature_index,
                        threshold: *threshold,
                        variance_reduction: *variance_reduction,
                    },
                });
                let left_id = self.collect(left);
                self.edges.push(GraphEdge {
                    from: id,
                    to: left_id,
                    branch: Branch::Yes,
                });
                let right_id = self.collect(right);
                self.edges.push(GraphEdge {
                    from: id,
                    to: right_id,
                    branch: Branch::No,
                });
            }
        }
        id
    }

    /// Rebuilds the tree the graph was exported from.
    pub fn to_tree(&self) -> Result<TreeNode<T>> {
        if self.nodes.is_empty() {
            return Err(TreeError::Parse("graph has no nodes".into()));
        }
        self.rebuild(0)
    }

    fn rebuild(&self, id: usize) -> Result<TreeNode<T>> {
        let node = self
            .nodes
            .iter()
            .find(|node| node.id == id)
            .ok_or_else(|| TreeError::Parse(format!("graph has no node {id}")))?;

        match &node.kind {
            GraphNodeKind::Leaf { value } => Ok(TreeNode::leaf(*value)),
            GraphNodeKind::Decision {
                feature_index,
                threshold,
                variance_reduction,
            } => Ok(TreeNode::Decision {
                feature_index: *feature_index,
                threshold: *threshold,
                variance_reduction: *variance_reduction,
                left: Box::new(self.rebuild(self.child(id, Branch::Yes)?)?),
                right: Box::new(self.rebuild(self.child(id, Branch::No)?)?),
            }),
        }
    }

    fn child(&self, id: usize, branch: Branch) -> Result<usize> {
        let edge = self
            .edges
            .iter()
            .find(|edge| edge.from == id && edge.branch == branch)
            .ok_or_else(|| TreeError::Parse(format!("node {id} lacks its {branch:?} edge")))?;
        if edge.to <= id {
            return Err(TreeError::Parse(format!(
                "edge {} -> {} doesn't point forward",
                edge.from, edge.to
            )));
        }
        Ok(edge.to)
    }

    /// Graphviz DOT text for the graph.
    pub fn to_dot(&self) -> String {
        self.to_string()
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_dot())?;
        Ok(())
    }
}

/// Renders the graph as Graphviz DOT.
impl<T> Display for TreeGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph RegressionTree {{")?;
        for node in &self.nodes {
            let shape = match node.kind {
                GraphNodeKind::Leaf { .. } => "ellipse",
                GraphNodeKind::Decision { .. } => "box",
            };
            writeln!(
                f,
                "    {} [label=\"{}\", shape={}];",
                node.id, node.label, shape
            )?;
        }
        for edge in &self.edges {
            let label = match edge.branch {
                Branch::Yes => "yes",
                Branch::No => "no",
            };
            writeln!(f, "    {} -> {} [label=\"{}\"];", edge.from, edge.to, label)?;
        }
        writeln!(f, "}}")
    }
}
