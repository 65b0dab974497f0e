use trellis_dom::{Document, DomError, Host, Mutation, Value};

fn container(doc: &mut Document) -> trellis_dom::NodeId {
    let body = doc.body();
    let root = doc.create_element("div");
    doc.append_child(body, root).unwrap();
    doc.take_mutations();
    root
}

// ============================================================================
// Tree Structure
// ============================================================================

#[test]
fn test_append_and_siblings() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let a = doc.create_element("a");
    let b = doc.create_text("b");
    doc.append_child(root, a).unwrap();
    doc.append_child(root, b).unwrap();

    assert_eq!(doc.children(root), &[a, b]);
    assert_eq!(doc.next_sibling(a).unwrap(), Some(b));
    assert_eq!(doc.next_sibling(b).unwrap(), None);
    assert_eq!(doc.parent(b).unwrap(), Some(root));
}

#[test]
fn test_insert_before_reference() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let a = doc.create_element("a");
    let c = doc.create_element("c");
    doc.append_child(root, a).unwrap();
    doc.append_child(root, c).unwrap();

    let b = doc.create_element("b");
    doc.insert_before(root, b, Some(c)).unwrap();
    assert_eq!(doc.children(root), &[a, b, c]);
}

#[test]
fn test_insert_moves_attached_node() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let a = doc.create_element("a");
    let b = doc.create_element("b");
    doc.append_child(root, a).unwrap();
    doc.append_child(root, b).unwrap();

    doc.insert_before(root, b, Some(a)).unwrap();
    assert_eq!(doc.children(root), &[b, a]);
}

#[test]
fn test_insert_before_foreign_reference_fails() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let stranger = doc.create_element("span");
    let child = doc.create_element("p");

    assert_eq!(
        doc.insert_before(root, child, Some(stranger)),
        Err(DomError::NotAChild {
            parent: root,
            child: stranger
        })
    );
}

#[test]
fn test_remove_detached_is_noop() {
    let mut doc = Document::new();
    let orphan = doc.create_text("x");
    doc.take_mutations();

    doc.remove(orphan).unwrap();
    assert!(doc.take_mutations().is_empty());
}

#[test]
fn test_missing_node() {
    let doc = Document::new();
    let mut other = Document::new();
    let foreign = other.create_element("div");
    assert_eq!(doc.parent(foreign), Err(DomError::NodeNotFound(foreign)));
}

// ============================================================================
// Attributes and Properties
// ============================================================================

#[test]
fn test_dataset_maps_to_kebab_attribute() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    doc.set_data(root, "todoId", "42").unwrap();

    assert_eq!(doc.attribute(root, "data-todo-id").unwrap().as_deref(), Some("42"));
    doc.remove_data(root, "todoId").unwrap();
    assert_eq!(doc.attribute(root, "data-todo-id").unwrap(), None);
}

#[test]
fn test_value_property_is_separate_from_attribute() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let input = doc.create_element("input");
    doc.append_child(root, input).unwrap();

    doc.set_attribute(input, "value", "declared").unwrap();
    doc.set_property(input, "value", Value::from("live")).unwrap();

    assert_eq!(doc.attribute(input, "value").unwrap().as_deref(), Some("declared"));
    assert_eq!(doc.property(input, "value").unwrap(), Value::from("live"));
}

#[test]
fn test_checked_property_resets_with_null() {
    let mut doc = Document::new();
    let input = doc.create_element("input");
    doc.set_attribute(input, "type", "checkbox").unwrap();

    doc.set_property(input, "checked", Value::Bool(true)).unwrap();
    assert_eq!(doc.property(input, "checked").unwrap(), Value::Bool(true));
    doc.set_property(input, "checked", Value::Null).unwrap();
    assert_eq!(doc.property(input, "checked").unwrap(), Value::Bool(false));
}

#[test]
fn test_live_properties_by_tag() {
    let mut doc = Document::new();
    let input = doc.create_element("input");
    let div = doc.create_element("div");

    assert!(doc.has_property(input, "value"));
    assert!(doc.has_property(input, "checked"));
    assert!(!doc.has_property(input, "title"));
    assert!(!doc.has_property(div, "value"));
}

#[test]
fn test_setting_value_moves_caret_to_end() {
    let mut doc = Document::new();
    let input = doc.create_element("input");
    doc.set_property(input, "value", Value::from("hello")).unwrap();
    doc.set_selection(input, 2, 2).unwrap();

    doc.set_property(input, "value", Value::from("hello!")).unwrap();
    assert_eq!(doc.selection(input).unwrap(), Some((6, 6)));
}

#[test]
fn test_selection_only_on_text_controls() {
    let mut doc = Document::new();
    let checkbox = doc.create_element("input");
    doc.set_attribute(checkbox, "type", "checkbox").unwrap();
    let div = doc.create_element("div");

    assert_eq!(doc.selection(checkbox).unwrap(), None);
    assert_eq!(doc.selection(div).unwrap(), None);
    assert_eq!(
        doc.set_selection(div, 0, 0),
        Err(DomError::NotTextControl(div))
    );
}

// ============================================================================
// Journal
// ============================================================================

#[test]
fn test_journal_records_mutations_in_order() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let p = doc.create_element("p");
    doc.set_attribute(p, "title", "x").unwrap();
    doc.append_child(root, p).unwrap();

    assert_eq!(
        doc.take_mutations(),
        vec![
            Mutation::CreateElement {
                node: p,
                tag: "p".to_string()
            },
            Mutation::SetAttribute {
                node: p,
                name: "title".to_string()
            },
            Mutation::Insert {
                parent: root,
                child: p,
                before: None
            },
        ]
    );
    assert!(doc.mutations().is_empty());
}

#[test]
fn test_removing_absent_attribute_is_not_journaled() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    doc.remove_attribute(root, "title").unwrap();
    assert!(doc.take_mutations().is_empty());
}

#[test]
fn test_html_roundtrip_of_tree() {
    let mut doc = Document::new();
    let root = container(&mut doc);
    let ul = doc.create_element("ul");
    let li = doc.create_element("li");
    let text = doc.create_text("milk");
    doc.append_child(root, ul).unwrap();
    doc.append_child(ul, li).unwrap();
    doc.append_child(li, text).unwrap();

    assert_eq!(doc.inner_html(root), "<ul><li>milk</li></ul>");
    assert_eq!(doc.text_content(root), "milk");
}
