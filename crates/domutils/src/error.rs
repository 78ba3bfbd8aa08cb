//! Error types for DOM operations
//!
//! Flat error hierarchy. Searches and accessors never fail; only mutation,
//! id lookup and tree loading produce errors.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    /// The child list and the parent/prev/next links disagree.
    ///
    /// The tree was already corrupted by an earlier operation; there is no
    /// recovery path.
    #[error("Invalid state at node {node}: {reason}")]
    InvariantViolation { node: NodeId, reason: &'static str },

    #[error("Node {node} cannot be inserted into its own subtree at {target}")]
    HierarchyRequest { node: NodeId, target: NodeId },

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl DomError {
    /// True for errors that mean the tree itself is corrupt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomError::InvariantViolation { .. })
    }
}
