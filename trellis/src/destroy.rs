//! Destroyer: tears a mounted subtree out of the host.

use std::mem;

use trellis_dom::Host;

use crate::error::StructuralError;
use crate::listeners;
use crate::node::Node;

/// Remove listeners, destroy children, then detach the node itself. Nodes
/// that own no handle are skipped, so destroying twice is harmless.
pub fn destroy<H: Host>(host: &mut H, node: &mut Node) -> Result<(), StructuralError> {
    match node {
        Node::Text(text) => {
            if let Some(handle) = text.mount.handle.take() {
                host.remove(handle)?;
            }
        }
        Node::Element(el) => {
            let Some(handle) = el.mount.handle.take() else {
                return Ok(());
            };
            let receipt = mem::take(&mut el.mount.listeners);
            listeners::detach(host, handle, &receipt)?;
            for child in &mut el.children {
                destroy(host, child)?;
            }
            host.remove(handle)?;
        }
        Node::Fragment(frag) => {
            if frag.mount.handle.take().is_none() {
                return Ok(());
            }
            for child in &mut frag.children {
                destroy(host, child)?;
            }
        }
    }
    Ok(())
}
