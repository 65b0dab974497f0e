//! The host environment contract.
//!
//! A host is a mutable tree of named, attribute-bearing, event-subscribable
//! nodes with parent/child/sibling relations and a focused node with a caret
//! range. The reconciliation engine only ever talks to this trait;
//! [`Document`](crate::Document) is the in-memory implementation.

use crate::error::DomError;
use crate::event::{Listener, ListenerId, PendingEvent};
use crate::node::NodeId;
use crate::value::Value;

pub trait Host {
    // -------------------------------------------------------------------------
    // Node creation
    // -------------------------------------------------------------------------

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn create_text(&mut self, value: &str) -> NodeId;

    fn set_text(&mut self, node: NodeId, value: &str) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Tree structure
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Insert `child` before `reference`, or append when `reference` is None.
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError>;

    /// Detach a node from its parent. Detaching a detached node is a no-op.
    fn remove(&mut self, node: NodeId) -> Result<(), DomError>;

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    fn child_count(&self, node: NodeId) -> Result<usize, DomError>;

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;

    fn set_class_name(&mut self, node: NodeId, class: &str) -> Result<(), DomError>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError>;

    fn clear_style(&mut self, node: NodeId) -> Result<(), DomError>;

    /// Set a dataset entry. `key` is camelCase (`todoId` → `data-todo-id`).
    fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> Result<(), DomError>;

    fn remove_data(&mut self, node: NodeId, key: &str) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Live properties
    // -------------------------------------------------------------------------

    /// Whether `name` is a live property of the node (e.g. `value` on inputs).
    fn has_property(&self, node: NodeId, name: &str) -> bool;

    fn property(&self, node: NodeId, name: &str) -> Result<Value, DomError>;

    /// Set a live property. `Value::Null` resets it.
    fn set_property(&mut self, node: NodeId, name: &str, value: Value) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    /// Install the listener for `event`, replacing any previous one.
    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        id: ListenerId,
        listener: Listener,
    ) -> Result<(), DomError>;

    /// Remove the listener for `event` if it is still the one registered as
    /// `id`. Returns whether a listener was removed.
    fn remove_listener(&mut self, node: NodeId, event: &str, id: ListenerId)
        -> Result<bool, DomError>;

    // -------------------------------------------------------------------------
    // Focus and caret
    // -------------------------------------------------------------------------

    fn focused(&self) -> Option<NodeId>;

    fn focus(&mut self, node: NodeId) -> Result<(), DomError>;

    fn blur(&mut self);

    /// Caret range of a text control, or None for other nodes.
    fn selection(&self, node: NodeId) -> Result<Option<(usize, usize)>, DomError>;

    fn set_selection(&mut self, node: NodeId, start: usize, end: usize) -> Result<(), DomError>;

    /// Events raised by mutations (focus, blur) that must be delivered once the
    /// host is no longer borrowed.
    fn take_pending_events(&mut self) -> Vec<PendingEvent>;
}
