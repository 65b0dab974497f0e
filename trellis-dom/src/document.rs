use std::collections::BTreeMap;

use log::trace;

use crate::error::DomError;
use crate::event::{Event, Listener, ListenerId, PendingEvent};
use crate::focus::FocusState;
use crate::host::Host;
use crate::journal::Mutation;
use crate::node::{ElementData, NodeData, NodeId, NodeKind};
use crate::value::Value;

/// In-memory host: an arena of nodes rooted at a `body` element.
///
/// Nodes are never freed; a removed node stays addressable (and can be
/// re-inserted) the way a detached DOM node does. Memory therefore grows with
/// every node ever created, as does the journal until
/// [`take_mutations`](Document::take_mutations) drains it. Suited to tests and
/// short interactive sessions, not to a long-running host.
pub struct Document {
    nodes: Vec<NodeData>,
    body: NodeId,
    focus: FocusState,
    pending: Vec<PendingEvent>,
    journal: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focus.focused())
            .field("html", &self.to_html(self.body))
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = NodeData {
            kind: NodeKind::Element(ElementData::new("body")),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            focus: FocusState::new(),
            pending: Vec::new(),
            journal: Vec::new(),
        }
    }

    /// The root element every attached node descends from.
    pub fn body(&self) -> NodeId {
        self.body
    }

    // -------------------------------------------------------------------------
    // Mutation journal
    // -------------------------------------------------------------------------

    pub fn mutations(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the journal, returning everything recorded since the last call.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, mutation: Mutation) {
        trace!("[document] {mutation:?}");
        self.journal.push(mutation);
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(|el| el.tag.as_str())
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.data(node).ok()?.kind {
            NodeKind::Text(s) => Some(s),
            NodeKind::Element(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).ok()?.style.get(property).map(String::as_str)
    }

    pub fn style_count(&self, node: NodeId) -> usize {
        self.element(node).map(|el| el.style.len()).unwrap_or(0)
    }

    pub fn attributes(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        self.element(node).ok().map(|el| &el.attributes)
    }

    pub fn has_listener(&self, node: NodeId, event: &str) -> bool {
        self.element(node)
            .map(|el| el.listeners.contains_key(event))
            .unwrap_or(false)
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.element(node).map(|el| el.listeners.len()).unwrap_or(0)
    }

    /// The listener currently registered for `event`, if any.
    pub fn listener(&self, node: NodeId, event: &str) -> Option<Listener> {
        self.element(node)
            .ok()?
            .listeners
            .get(event)
            .map(|(_, l)| l.clone())
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.data(id).ok().and_then(|n| n.parent);
        }
        false
    }

    /// Whether the node is reachable from `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Ok(data) = self.data(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Element(_) => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Build an event targeted at `target`, snapshotting its live value and
    /// checked state.
    pub fn event(&self, name: &str, target: NodeId) -> Event {
        let mut event = Event::new(name, target);
        if let Ok(el) = self.element(target) {
            if let Some(input) = &el.input {
                event = event.with_value(input.text.clone());
            }
            if el.has_property("checked") {
                event = event.with_checked(el.flags.get("checked").copied().unwrap_or(false));
            }
        }
        event
    }

    /// Listeners for `event` from the target up through its ancestors, in
    /// bubbling order. Computed up front so delivery needs no borrow.
    pub fn propagation_path(&self, target: NodeId, event: &str) -> Vec<(NodeId, Listener)> {
        let mut path = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            if let Some(listener) = self.listener(id, event) {
                path.push((id, listener));
            }
            current = self.data(id).ok().and_then(|n| n.parent);
        }
        path
    }

    /// Mutable access to a text control's editing state.
    pub(crate) fn with_input<R>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut crate::text_input::TextInputData) -> R,
    ) -> Result<R, DomError> {
        let el = self.element_mut(node)?;
        if !el.is_text_control() {
            return Err(DomError::NotTextControl(node));
        }
        let input = el.input.as_mut().ok_or(DomError::NotTextControl(node))?;
        Ok(f(input))
    }

    /// Flip a checkbox's `checked` flag, returning the new state.
    pub(crate) fn toggle_checked(&mut self, node: NodeId) -> Result<Option<bool>, DomError> {
        let el = self.element_mut(node)?;
        let is_toggle = el.tag == "input"
            && matches!(
                el.attributes.get("type").map(String::as_str),
                Some("checkbox" | "radio")
            );
        if !is_toggle {
            return Ok(None);
        }
        let checked = el.flags.entry("checked".to_string()).or_insert(false);
        *checked = !*checked;
        Ok(Some(*checked))
    }

    // -------------------------------------------------------------------------
    // Arena access
    // -------------------------------------------------------------------------

    pub(crate) fn data(&self, node: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(node.0).ok_or(DomError::NodeNotFound(node))
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::NodeNotFound(node))
    }

    pub(crate) fn element(&self, node: NodeId) -> Result<&ElementData, DomError> {
        self.data(node)?
            .element()
            .ok_or(DomError::NotAnElement(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        self.data_mut(node)?
            .element_mut()
            .ok_or(DomError::NotAnElement(node))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Unlink a node from its parent without journaling.
    fn unlink(&mut self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        let Some(parent) = self.data(node)?.parent else {
            return Ok(None);
        };
        self.data_mut(parent)?.children.retain(|c| *c != node);
        self.data_mut(node)?.parent = None;
        Ok(Some(parent))
    }

    /// Focus moves back to nothing when the focused node leaves the tree.
    fn fix_focus_after_removal(&mut self, removed: NodeId) {
        if let Some(focused) = self.focus.focused() {
            if self.contains(removed, focused) {
                trace!("[document] focused node {focused} removed, clearing focus");
                self.focus.blur();
            }
        }
    }

    fn queue_event(&mut self, name: &str, target: NodeId) {
        if let Some(listener) = self.listener(target, name) {
            let event = self.event(name, target);
            self.pending.push(PendingEvent { listener, event });
        }
    }
}

/// `todoId` → `data-todo-id`.
pub fn data_attribute_name(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

impl Host for Document {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.push(NodeKind::Element(ElementData::new(tag)));
        self.record(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, value: &str) -> NodeId {
        let node = self.push(NodeKind::Text(value.to_string()));
        self.record(Mutation::CreateText { node });
        node
    }

    fn set_text(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Text(s) => *s = value.to_string(),
            NodeKind::Element(_) => return Err(DomError::NotAText(node)),
        }
        self.record(Mutation::SetText { node });
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.element(parent)
            .map_err(|_| DomError::HierarchyRequest { parent, child })?;
        self.data(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.data(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.unlink(child)?;
        let siblings = &mut self.data_mut(parent)?.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.data_mut(child)?.parent = Some(parent);

        self.record(Mutation::Insert {
            parent,
            child,
            before: reference,
        });
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.unlink(node)? {
            self.fix_focus_after_removal(node);
            self.record(Mutation::Remove {
                parent,
                child: node,
            });
        }
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.data(node)?.parent)
    }

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        let Some(parent) = self.data(node)?.parent else {
            return Ok(None);
        };
        let siblings = &self.data(parent)?.children;
        Ok(siblings
            .iter()
            .position(|c| *c == node)
            .and_then(|i| siblings.get(i + 1))
            .copied())
    }

    fn child_count(&self, node: NodeId) -> Result<usize, DomError> {
        Ok(self.data(node)?.children.len())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element(node)?.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.record(Mutation::SetAttribute {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        if self.element_mut(node)?.attributes.remove(name).is_some() {
            self.record(Mutation::RemoveAttribute {
                node,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn set_class_name(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert("class".to_string(), class.to_string());
        self.record(Mutation::SetClass { node });
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let style = &mut self.element_mut(node)?.style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
        self.record(Mutation::SetStyle {
            node,
            property: property.to_string(),
        });
        Ok(())
    }

    fn clear_style(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element_mut(node)?.style.clear();
        self.record(Mutation::ClearStyle { node });
        Ok(())
    }

    fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(data_attribute_name(key), value.to_string());
        self.record(Mutation::SetData {
            node,
            key: key.to_string(),
        });
        Ok(())
    }

    fn remove_data(&mut self, node: NodeId, key: &str) -> Result<(), DomError> {
        if self
            .element_mut(node)?
            .attributes
            .remove(&data_attribute_name(key))
            .is_some()
        {
            self.record(Mutation::RemoveData {
                node,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn has_property(&self, node: NodeId, name: &str) -> bool {
        self.element(node)
            .map(|el| el.has_property(name))
            .unwrap_or(false)
    }

    fn property(&self, node: NodeId, name: &str) -> Result<Value, DomError> {
        Ok(self.element(node)?.property(name))
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: Value) -> Result<(), DomError> {
        let el = self.element_mut(node)?;
        if !el.has_property(name) {
            trace!("[document] ignoring unknown property {name} on <{}>", el.tag);
            return Ok(());
        }
        if name == "value" {
            if let Some(input) = el.input.as_mut() {
                input.set_text(value.to_attribute_string());
            }
        } else {
            el.flags.insert(name.to_string(), value.truthy());
        }
        self.record(Mutation::SetProperty {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        id: ListenerId,
        listener: Listener,
    ) -> Result<(), DomError> {
        self.element_mut(node)?
            .listeners
            .insert(event.to_string(), (id, listener));
        self.record(Mutation::AddListener {
            node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: NodeId,
        event: &str,
        id: ListenerId,
    ) -> Result<bool, DomError> {
        let listeners = &mut self.element_mut(node)?.listeners;
        if listeners.get(event).map(|(current, _)| *current) != Some(id) {
            return Ok(false);
        }
        listeners.remove(event);
        self.record(Mutation::RemoveListener {
            node,
            event: event.to_string(),
        });
        Ok(true)
    }

    fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element(node)?;
        let Some(previous) = self.focus.focus(node) else {
            return Ok(());
        };
        if let Some(previous) = previous {
            self.record(Mutation::Blur { node: previous });
            self.queue_event("blur", previous);
        }
        self.record(Mutation::Focus { node });
        self.queue_event("focus", node);
        Ok(())
    }

    fn blur(&mut self) {
        if let Some(previous) = self.focus.blur() {
            self.record(Mutation::Blur { node: previous });
            self.queue_event("blur", previous);
        }
    }

    fn selection(&self, node: NodeId) -> Result<Option<(usize, usize)>, DomError> {
        let el = self.element(node)?;
        if !el.is_text_control() {
            return Ok(None);
        }
        Ok(el.input.as_ref().map(|input| input.range()))
    }

    fn set_selection(&mut self, node: NodeId, start: usize, end: usize) -> Result<(), DomError> {
        self.with_input(node, |input| input.set_range(start, end))?;
        self.record(Mutation::SetSelection { node });
        Ok(())
    }

    fn take_pending_events(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }
}
