//! Tree model: the immutable description of a UI that views return.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use trellis_dom::{Event, ListenerId, NodeId, Value};

/// An event callback declared in a view.
pub type Handler = Rc<dyn Fn(&Event)>;

/// Reserved attribute carrying the class string.
pub const CLASS: &str = "class";
/// Reserved attribute carrying a map of style properties.
pub const STYLE: &str = "style";
/// Reserved attribute carrying a map of dataset entries.
pub const DATASET: &str = "dataset";

// =============================================================================
// Mount bookkeeping
// =============================================================================

/// One listener installed on a concrete node.
#[derive(Clone)]
pub(crate) struct Registration {
    pub id: ListenerId,
    /// The declared handler, kept to recognise an unchanged closure.
    pub handler: Handler,
}

/// Active-listener receipt: event name → installed listener.
pub(crate) type Receipt = BTreeMap<String, Registration>;

/// Handle + receipt of a mounted node. Cloning yields the unmounted state, so
/// a clone of a live tree is always a pending tree.
#[derive(Default)]
pub(crate) struct Mount {
    pub handle: Option<NodeId>,
    pub listeners: Receipt,
}

impl Clone for Mount {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Some(handle) => write!(f, "Mounted({handle})"),
            None => write!(f, "Unmounted"),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Variant tag of a [`Node`], used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    Fragment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Text => write!(f, "text"),
            NodeKind::Element => write!(f, "element"),
            NodeKind::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Text(Text),
    Element(Element),
    Fragment(Fragment),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text::new(value))
    }

    /// Build an element from a tag, its props and its children.
    pub fn element<C: Into<Child>>(
        tag: impl Into<String>,
        props: Props,
        children: impl IntoIterator<Item = C>,
    ) -> Self {
        Node::Element(Element {
            tag: tag.into(),
            props,
            children: collect_children(children),
            mount: Mount::default(),
        })
    }

    pub fn fragment<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> Self {
        Node::Fragment(Fragment::new(children))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text(_) => NodeKind::Text,
            Node::Element(_) => NodeKind::Element,
            Node::Fragment(_) => NodeKind::Fragment,
        }
    }

    /// The concrete node this node owns while mounted. For fragments this is
    /// the parent container.
    pub fn handle(&self) -> Option<NodeId> {
        self.mount().handle
    }

    pub fn is_mounted(&self) -> bool {
        self.handle().is_some()
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Element(el) => &el.children,
            Node::Fragment(frag) => &frag.children,
        }
    }

    pub(crate) fn mount(&self) -> &Mount {
        match self {
            Node::Text(t) => &t.mount,
            Node::Element(el) => &el.mount,
            Node::Fragment(frag) => &frag.mount,
        }
    }

    /// First concrete node in document order, if any is mounted.
    pub(crate) fn first_concrete(&self) -> Option<NodeId> {
        match self {
            Node::Text(_) | Node::Element(_) => self.handle(),
            Node::Fragment(frag) => frag.children.iter().find_map(Node::first_concrete),
        }
    }

    /// Last concrete node in document order, if any is mounted.
    pub(crate) fn last_concrete(&self) -> Option<NodeId> {
        match self {
            Node::Text(_) | Node::Element(_) => self.handle(),
            Node::Fragment(frag) => frag.children.iter().rev().find_map(Node::last_concrete),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    pub value: String,
    pub(crate) mount: Mount,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            mount: Mount::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub children: Vec<Node>,
    pub(crate) mount: Mount,
}

impl Fragment {
    pub fn new<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> Self {
        Self {
            children: collect_children(children),
            mount: Mount::default(),
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// Attributes plus event handlers of an element.
#[derive(Clone, Default)]
pub struct Props {
    pub attrs: BTreeMap<String, Value>,
    pub on: BTreeMap<String, Handler>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr(CLASS, class.into())
    }

    /// Add one style property to the `style` map.
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        map_entry(&mut self.attrs, STYLE).insert(property.into(), value.into());
        self
    }

    /// Add one dataset entry. Keys are camelCase (`todoId`).
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        map_entry(&mut self.attrs, DATASET).insert(key.into(), value.into());
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.on.insert(event.into(), Rc::new(handler));
        self
    }

    /// Register an already shared handler.
    pub fn handler(mut self, event: impl Into<String>, handler: Handler) -> Self {
        self.on.insert(event.into(), handler);
        self
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("attrs", &self.attrs)
            .field("on", &self.on.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn map_entry<'a>(
    attrs: &'a mut BTreeMap<String, Value>,
    name: &str,
) -> &'a mut BTreeMap<String, String> {
    let slot = attrs.entry(name.to_string()).or_insert(Value::Map(BTreeMap::new()));
    if !matches!(slot, Value::Map(_)) {
        *slot = Value::Map(BTreeMap::new());
    }
    match slot {
        Value::Map(map) => map,
        _ => unreachable!("slot was just set to a map"),
    }
}

// =============================================================================
// Element
// =============================================================================

#[derive(Clone)]
pub struct Element {
    pub tag: String,
    pub props: Props,
    pub children: Vec<Node>,
    pub(crate) mount: Mount,
}

impl Element {
    /// Unknown tags pass through verbatim.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Props::default(),
            children: Vec::new(),
            mount: Mount::default(),
        }
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props = self.props.attr(name, value);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.props = self.props.class(class);
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.props = self.props.style(property, value);
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props = self.props.data(key, value);
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.props = self.props.on(event, handler);
        self
    }

    /// Append a child. `None` children are dropped.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        if let Some(node) = child.into().0 {
            self.children.push(node);
        }
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(collect_children(children));
        self
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("props", &self.props)
            .field("children", &self.children)
            .field("mount", &self.mount)
            .finish()
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Fragment> for Node {
    fn from(frag: Fragment) -> Self {
        Node::Fragment(frag)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::text(s)
    }
}

// =============================================================================
// Child
// =============================================================================

/// A child slot as written in a view: a node, a bare string, or nothing.
#[derive(Debug, Clone)]
pub struct Child(Option<Node>);

macro_rules! child_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child(Some(value.into()))
                }
            }

            impl From<Option<$ty>> for Child {
                fn from(value: Option<$ty>) -> Self {
                    Child(value.map(Into::into))
                }
            }
        )*
    };
}

child_from!(Node, Element, Text, Fragment, &str, String);

fn collect_children<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> Vec<Node> {
    children.into_iter().filter_map(|c| c.into().0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullish_children_dropped_and_strings_boxed() {
        let node = Node::element(
            "ul",
            Props::new(),
            [Child::from("a"), Child::from(None::<Node>), Child::from(Node::text("b"))],
        );
        let kinds: Vec<_> = node.children().iter().map(Node::kind).collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::Text]);
    }

    #[test]
    fn test_builder_collects_style_and_dataset() {
        let Node::Element(el) = Node::from(
            Element::new("li")
                .class("item")
                .style("color", "red")
                .style("margin", "0")
                .data("todoId", "7"),
        ) else {
            panic!("expected element");
        };
        let style = el.props.attrs[STYLE].as_map().unwrap();
        assert_eq!(style.len(), 2);
        assert_eq!(el.props.attrs[DATASET].as_map().unwrap()["todoId"], "7");
        assert_eq!(el.props.attrs[CLASS], Value::from("item"));
    }

    #[test]
    fn test_child_option_dropped() {
        let editing = false;
        let Node::Element(el) = Node::from(
            Element::new("li")
                .child("label")
                .child(editing.then(|| Element::new("input"))),
        ) else {
            panic!("expected element");
        };
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_clone_is_unmounted() {
        let mut text = Text::new("x");
        text.mount.handle = Some(trellis_dom::Document::new().body());
        let node = Node::Text(text);
        assert!(node.is_mounted());
        assert!(!node.clone().is_mounted());
    }
}
