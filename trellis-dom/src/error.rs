use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by host tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0} is not a text node")]
    NotAText(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Inserting would create a cycle or put a child under a text node.
    #[error("cannot insert {child} under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0} has no selectable text")]
    NotTextControl(NodeId),
}
