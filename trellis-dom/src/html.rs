use crate::document::Document;
use crate::node::{NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

impl Document {
    /// Serialize a node and its subtree. Missing nodes serialize to "".
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize only the children of a node.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Ok(data) = self.data(node) else {
            return;
        };
        let el = match &data.kind {
            NodeKind::Text(s) => {
                out.push_str(&escape(s, false));
                return;
            }
            NodeKind::Element(el) => el,
        };

        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in &el.attributes {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
        }
        if !el.style.is_empty() {
            let style = el
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(" style=\"");
            out.push_str(&escape(&style, true));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&el.tag.as_str()) {
            return;
        }
        for child in &data.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
