use crate::node::NodeId;

/// One recorded host operation. [`Document`](crate::Document) appends an entry
/// for every mutation so callers can count exactly what a render touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId },
    SetText { node: NodeId },
    Insert { parent: NodeId, child: NodeId, before: Option<NodeId> },
    Remove { parent: NodeId, child: NodeId },
    SetAttribute { node: NodeId, name: String },
    RemoveAttribute { node: NodeId, name: String },
    SetClass { node: NodeId },
    SetStyle { node: NodeId, property: String },
    ClearStyle { node: NodeId },
    SetData { node: NodeId, key: String },
    RemoveData { node: NodeId, key: String },
    SetProperty { node: NodeId, name: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    Focus { node: NodeId },
    Blur { node: NodeId },
    SetSelection { node: NodeId },
}

impl Mutation {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::CreateElement { .. }
                | Mutation::CreateText { .. }
                | Mutation::Insert { .. }
                | Mutation::Remove { .. }
        )
    }

    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            Mutation::SetAttribute { .. }
                | Mutation::RemoveAttribute { .. }
                | Mutation::SetClass { .. }
                | Mutation::SetStyle { .. }
                | Mutation::ClearStyle { .. }
                | Mutation::SetData { .. }
                | Mutation::RemoveData { .. }
                | Mutation::SetProperty { .. }
        )
    }

    pub fn is_listener(&self) -> bool {
        matches!(
            self,
            Mutation::AddListener { .. } | Mutation::RemoveListener { .. }
        )
    }
}
