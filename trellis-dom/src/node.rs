use std::collections::BTreeMap;
use std::fmt;

use crate::event::{Listener, ListenerId};
use crate::text_input::TextInputData;
use crate::value::Value;

/// Handle to a node owned by a [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
}

pub(crate) struct ElementData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    /// Boolean live properties (`checked`, `disabled`, `selected`).
    pub flags: BTreeMap<String, bool>,
    pub listeners: BTreeMap<String, (ListenerId, Listener)>,
    /// Present for `input` and `textarea`.
    pub input: Option<TextInputData>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        let input = matches!(tag, "input" | "textarea").then(TextInputData::default);
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            flags: BTreeMap::new(),
            listeners: BTreeMap::new(),
            input,
        }
    }

    /// Names of the live properties this element exposes.
    pub fn live_properties(&self) -> &'static [&'static str] {
        match self.tag.as_str() {
            "input" => &["value", "checked", "disabled"],
            "textarea" | "select" => &["value", "disabled"],
            "option" => &["selected", "disabled"],
            "button" | "fieldset" => &["disabled"],
            _ => &[],
        }
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.live_properties().contains(&name)
    }

    /// Text controls carry a caret. Checkbox-like inputs do not.
    pub fn is_text_control(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.attributes.get("type").map(String::as_str),
                Some("checkbox" | "radio" | "button" | "submit" | "reset")
            ),
            _ => false,
        }
    }

    pub fn property(&self, name: &str) -> Value {
        if name == "value" {
            if let Some(input) = &self.input {
                return Value::Str(input.text.clone());
            }
            return self
                .attributes
                .get("value")
                .map_or(Value::Null, |v| Value::Str(v.clone()));
        }
        match self.flags.get(name) {
            Some(b) => Value::Bool(*b),
            None if self.has_property(name) => Value::Bool(false),
            None => Value::Null,
        }
    }
}

impl NodeData {
    pub fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }
}
