//! Positional reconciler.
//!
//! Children are matched strictly by index: no keys, no moves. A slot whose
//! old and new nodes differ in variant (or element tag) is replaced in place;
//! otherwise the old node's handle migrates onto the new node and only the
//! differences are written to the host.

use std::collections::BTreeMap;
use std::mem;

use log::{debug, trace};
use trellis_dom::{Host, NodeId, Value};

use crate::attributes;
use crate::destroy::destroy;
use crate::error::StructuralError;
use crate::listeners;
use crate::mount::mount_before;
use crate::node::{Element, Handler, Node, NodeKind, Receipt};

/// Reconcile one slot under `parent`.
///
/// - only `new`: mount it
/// - only `old`: destroy it
/// - both: update in place, or replace on a type mismatch
///
/// Afterwards `new` owns every handle that survived and `old` owns none.
pub fn patch<H: Host>(
    host: &mut H,
    old: Option<&mut Node>,
    new: Option<&mut Node>,
    parent: NodeId,
) -> Result<(), StructuralError> {
    patch_slot(host, old, new, parent, None)
}

/// `anchor` is the node that follows this slot in the parent, if any.
fn patch_slot<H: Host>(
    host: &mut H,
    old: Option<&mut Node>,
    new: Option<&mut Node>,
    parent: NodeId,
    anchor: Option<NodeId>,
) -> Result<(), StructuralError> {
    match (old, new) {
        (None, None) => Ok(()),
        (None, Some(new)) => mount_before(host, new, parent, anchor),
        (Some(old), None) => destroy(host, old),
        (Some(old), Some(new)) => patch_node(host, old, new, parent, anchor),
    }
}

fn patch_node<H: Host>(
    host: &mut H,
    old: &mut Node,
    new: &mut Node,
    parent: NodeId,
    anchor: Option<NodeId>,
) -> Result<(), StructuralError> {
    if !old.is_mounted() {
        return Err(StructuralError::Unmounted { kind: old.kind() });
    }
    if new.is_mounted() {
        return Err(StructuralError::AlreadyMounted { kind: new.kind() });
    }

    match (old, new) {
        (Node::Text(o), Node::Text(n)) => {
            let handle = o.mount.handle.take();
            if let Some(handle) = handle
                && o.value != n.value
            {
                host.set_text(handle, &n.value)?;
            }
            n.mount.handle = handle;
        }
        (Node::Element(o), Node::Element(n)) if o.tag == n.tag => patch_element(host, o, n)?,
        (Node::Fragment(o), Node::Fragment(n)) => {
            n.mount.handle = o.mount.handle.take();
            patch_children(host, &mut o.children, &mut n.children, parent, anchor)?;
        }
        (old, new) => replace(host, old, new, parent, anchor)?,
    }
    Ok(())
}

fn patch_element<H: Host>(
    host: &mut H,
    old: &mut Element,
    new: &mut Element,
) -> Result<(), StructuralError> {
    let Some(handle) = old.mount.handle.take() else {
        return Err(StructuralError::Unmounted {
            kind: NodeKind::Element,
        });
    };
    new.mount.handle = Some(handle);

    patch_attributes(host, handle, &old.props.attrs, &new.props.attrs)?;
    let receipt = mem::take(&mut old.mount.listeners);
    new.mount.listeners = patch_listeners(host, handle, &receipt, &new.props.on)?;
    patch_children(host, &mut old.children, &mut new.children, handle, None)
}

/// Swap `old` for `new` at the same position: destroy, then a single
/// positioned insertion.
fn replace<H: Host>(
    host: &mut H,
    old: &mut Node,
    new: &mut Node,
    parent: NodeId,
    anchor: Option<NodeId>,
) -> Result<(), StructuralError> {
    debug!("[patch] replace {} with {} under {parent}", old.kind(), new.kind());
    let before = match old.last_concrete() {
        Some(last) => host.next_sibling(last)?,
        None => anchor,
    };
    destroy(host, old)?;
    mount_before(host, new, parent, before)
}

fn patch_attributes<H: Host>(
    host: &mut H,
    node: NodeId,
    old: &BTreeMap<String, Value>,
    new: &BTreeMap<String, Value>,
) -> Result<(), StructuralError> {
    for (name, previous) in old {
        if !new.contains_key(name) {
            attributes::clear(host, node, name, previous)?;
        }
    }
    for (name, value) in new {
        let previous = old.get(name);
        if previous != Some(value) {
            attributes::update(host, node, name, previous, value)?;
        }
    }
    Ok(())
}

fn patch_listeners<H: Host>(
    host: &mut H,
    node: NodeId,
    previous: &Receipt,
    handlers: &BTreeMap<String, Handler>,
) -> Result<Receipt, StructuralError> {
    for (event, registration) in previous {
        if !handlers.contains_key(event) {
            trace!("[patch] {node} drop '{event}' listener");
            host.remove_listener(node, event, registration.id)?;
        }
    }
    Ok(listeners::reattach(host, node, handlers, previous)?)
}

/// Pairwise reconcile by index up to the longer length.
fn patch_children<H: Host>(
    host: &mut H,
    old: &mut [Node],
    new: &mut [Node],
    parent: NodeId,
    anchor: Option<NodeId>,
) -> Result<(), StructuralError> {
    let len = old.len().max(new.len());
    for i in 0..len {
        // The old siblings after slot i are still untouched, so the first one
        // owning a concrete node marks where slot i ends.
        let slot_anchor = old
            .get(i + 1..)
            .unwrap_or_default()
            .iter()
            .find_map(Node::first_concrete)
            .or(anchor);
        patch_slot(host, old.get_mut(i), new.get_mut(i), parent, slot_anchor)?;
    }
    Ok(())
}
