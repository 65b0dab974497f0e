//! Mounter: materializes a pending tree into the host.

use log::trace;
use trellis_dom::{Host, NodeId};

use crate::attributes;
use crate::error::StructuralError;
use crate::listeners;
use crate::node::Node;

/// Materialize `node` and append it under `parent`.
///
/// Elements are fully built (listeners, attributes, children) before they are
/// attached, so the parent receives one insertion per top-level node.
pub fn mount<H: Host>(
    host: &mut H,
    node: &mut Node,
    parent: NodeId,
) -> Result<(), StructuralError> {
    mount_before(host, node, parent, None)
}

/// Materialize `node` under `parent`, positioned before `before` (or at the
/// end when `None`).
pub fn mount_before<H: Host>(
    host: &mut H,
    node: &mut Node,
    parent: NodeId,
    before: Option<NodeId>,
) -> Result<(), StructuralError> {
    if node.is_mounted() {
        return Err(StructuralError::AlreadyMounted { kind: node.kind() });
    }
    match node {
        Node::Text(text) => {
            let handle = host.create_text(&text.value);
            host.insert_before(parent, handle, before)?;
            text.mount.handle = Some(handle);
        }
        Node::Element(el) => {
            trace!("[mount] <{}> under {parent}", el.tag);
            let handle = host.create_element(&el.tag);
            el.mount.listeners = listeners::attach(host, handle, &el.props.on)?;
            attributes::apply(host, handle, &el.props.attrs)?;
            el.mount.handle = Some(handle);
            for child in &mut el.children {
                mount_before(host, child, handle, None)?;
            }
            host.insert_before(parent, handle, before)?;
        }
        Node::Fragment(frag) => {
            frag.mount.handle = Some(parent);
            for child in &mut frag.children {
                mount_before(host, child, parent, before)?;
            }
        }
    }
    Ok(())
}
