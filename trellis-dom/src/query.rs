use crate::document::Document;
use crate::node::NodeId;

impl Document {
    /// First node under `root` (inclusive, document order) matching `pred`.
    pub fn find(
        &self,
        root: NodeId,
        pred: &impl Fn(&Document, NodeId) -> bool,
    ) -> Option<NodeId> {
        if pred(self, root) {
            return Some(root);
        }
        self.children(root)
            .iter()
            .find_map(|child| self.find(*child, pred))
    }

    /// All nodes under `root` (inclusive, document order) matching `pred`.
    pub fn find_all(
        &self,
        root: NodeId,
        pred: &impl Fn(&Document, NodeId) -> bool,
    ) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect(root, pred, &mut found);
        found
    }

    fn collect(
        &self,
        node: NodeId,
        pred: &impl Fn(&Document, NodeId) -> bool,
        out: &mut Vec<NodeId>,
    ) {
        if pred(self, node) {
            out.push(node);
        }
        for child in self.children(node) {
            self.collect(*child, pred, out);
        }
    }

    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find(root, &|doc, id| doc.tag(id) == Some(tag))
    }

    /// First element whose class list contains `class`.
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.find(root, &|doc, id| {
            doc.attributes(id)
                .and_then(|attrs| attrs.get("class"))
                .is_some_and(|c| c.split_whitespace().any(|token| token == class))
        })
    }

    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.find(root, &|doc, id| {
            doc.attributes(id)
                .and_then(|attrs| attrs.get(name))
                .is_some_and(|v| v == value)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, Host};

    #[test]
    fn test_find_by_class_matches_tokens() {
        let mut doc = Document::new();
        let body = doc.body();
        let li = doc.create_element("li");
        doc.set_class_name(li, "completed editing").unwrap();
        doc.append_child(body, li).unwrap();

        assert_eq!(doc.find_by_class(body, "editing"), Some(li));
        assert_eq!(doc.find_by_class(body, "edit"), None);
    }

    #[test]
    fn test_find_all_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let ul = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        doc.append_child(body, ul).unwrap();
        doc.append_child(ul, a).unwrap();
        doc.append_child(ul, b).unwrap();

        assert_eq!(doc.find_all(body, &|doc, id| doc.tag(id) == Some("li")), vec![a, b]);
    }
}
