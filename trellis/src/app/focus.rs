//! Focus and caret preservation across renders.
//!
//! Before a render the focused element is reduced to a logical identity (its
//! identity attribute, else its first class token) plus its selection. After
//! reconciliation the new tree is searched in document order for the first
//! element with that identity, which is focused and gets the selection back.

use log::{trace, warn};
use trellis_dom::{DomError, Host, NodeId};

use crate::node::{CLASS, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Identity {
    Attribute(String),
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FocusContext {
    identity: Identity,
    selection: Option<(usize, usize)>,
}

impl FocusContext {
    /// Returns `None` when nothing inside `root` is focused or the focused
    /// element has no identity.
    pub fn capture<H: Host>(host: &H, root: NodeId, identity_attribute: &str) -> Option<Self> {
        let focused = host.focused()?;
        if !is_within(host, root, focused) {
            return None;
        }
        let identity = identify(host, focused, identity_attribute)?;
        let selection = host.selection(focused).ok().flatten();
        trace!("[focus] captured {identity:?} at {selection:?}");
        Some(Self {
            identity,
            selection,
        })
    }

    /// Focus the first matching element of `tree` and restore the selection.
    /// Returns the element focused, if any matched.
    pub fn restore<H: Host>(
        &self,
        host: &mut H,
        tree: &Node,
        identity_attribute: &str,
    ) -> Result<Option<NodeId>, DomError> {
        let Some(target) = self.find(host, tree, identity_attribute) else {
            warn!("[focus] {:?} is gone after render", self.identity);
            return Ok(None);
        };
        host.focus(target)?;
        if let Some((start, end)) = self.selection
            && host.selection(target)?.is_some()
        {
            host.set_selection(target, start, end)?;
        }
        Ok(Some(target))
    }

    fn find<H: Host>(&self, host: &H, node: &Node, identity_attribute: &str) -> Option<NodeId> {
        if let Node::Element(_) = node
            && let Some(handle) = node.handle()
            && self.matches(host, handle, identity_attribute)
        {
            return Some(handle);
        }
        node.children()
            .iter()
            .find_map(|child| self.find(host, child, identity_attribute))
    }

    fn matches<H: Host>(&self, host: &H, node: NodeId, identity_attribute: &str) -> bool {
        match &self.identity {
            Identity::Attribute(value) => {
                host.attribute(node, identity_attribute).ok().flatten().as_ref() == Some(value)
            }
            Identity::Class(token) => host
                .attribute(node, CLASS)
                .ok()
                .flatten()
                .is_some_and(|class| class.split_whitespace().any(|t| t == token)),
        }
    }
}

fn is_within<H: Host>(host: &H, root: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == root {
            return true;
        }
        current = host.parent(id).ok().flatten();
    }
    false
}

fn identify<H: Host>(host: &H, node: NodeId, identity_attribute: &str) -> Option<Identity> {
    if let Ok(Some(value)) = host.attribute(node, identity_attribute) {
        return Some(Identity::Attribute(value));
    }
    let class = host.attribute(node, CLASS).ok().flatten()?;
    let token = class.split_whitespace().next()?;
    Some(Identity::Class(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::mount;
    use crate::node::Element;
    use trellis_dom::Document;

    fn mounted(doc: &mut Document, tree: impl Into<Node>) -> Node {
        let body = doc.body();
        let mut tree = tree.into();
        mount(doc, &mut tree, body).unwrap();
        tree
    }

    #[test]
    fn test_nothing_focused() {
        let doc = Document::new();
        assert_eq!(FocusContext::capture(&doc, doc.body(), "data-id"), None);
    }

    #[test]
    fn test_identity_attribute_wins_over_class() {
        let mut doc = Document::new();
        let tree = mounted(&mut doc, Element::new("input").class("edit").attr("data-id", "7"));
        doc.focus(tree.handle().unwrap()).unwrap();

        let ctx = FocusContext::capture(&doc, doc.body(), "data-id").unwrap();
        assert_eq!(ctx.identity, Identity::Attribute("7".to_string()));
    }

    #[test]
    fn test_element_without_identity_is_not_captured() {
        let mut doc = Document::new();
        let tree = mounted(&mut doc, Element::new("input"));
        doc.focus(tree.handle().unwrap()).unwrap();
        assert_eq!(FocusContext::capture(&doc, doc.body(), "data-id"), None);
    }

    #[test]
    fn test_focus_outside_root_is_ignored() {
        let mut doc = Document::new();
        let outside = mounted(&mut doc, Element::new("input").class("search"));
        let root = mounted(&mut doc, Element::new("div"));
        doc.focus(outside.handle().unwrap()).unwrap();
        assert_eq!(FocusContext::capture(&doc, root.handle().unwrap(), "data-id"), None);
    }

    #[test]
    fn test_restore_finds_first_match_in_document_order() {
        let mut doc = Document::new();
        let tree = mounted(
            &mut doc,
            Element::new("div")
                .child(Element::new("span").class("other"))
                .child(Element::new("input").class("field first"))
                .child(Element::new("input").class("field second")),
        );
        let ctx = FocusContext {
            identity: Identity::Class("field".to_string()),
            selection: Some((0, 0)),
        };

        let target = ctx.restore(&mut doc, &tree, "data-id").unwrap();
        assert_eq!(target, tree.children()[1].handle());
        assert_eq!(doc.focused(), target);
    }
}
