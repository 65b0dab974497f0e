//! Attribute synchronizer: writes declared attributes onto concrete elements.
//!
//! Three names are reserved. `class` sets the class string, `style` replaces
//! the whole inline style from a map, and `dataset` writes `data-*` entries.
//! Every other name becomes a string attribute and, when the element has a
//! live property of that name (`value`, `checked`, ...), the property too.

use std::collections::BTreeMap;

use log::trace;
use trellis_dom::{DomError, Host, NodeId, Value};

use crate::node::{CLASS, DATASET, STYLE};

/// Write every declared attribute onto a freshly created element.
pub fn apply<H: Host>(
    host: &mut H,
    node: NodeId,
    attrs: &BTreeMap<String, Value>,
) -> Result<(), DomError> {
    for (name, value) in attrs {
        update(host, node, name, None, value)?;
    }
    Ok(())
}

/// Write one attribute. `previous` is the value it replaces, if any; stale
/// dataset keys are removed from it.
pub fn update<H: Host>(
    host: &mut H,
    node: NodeId,
    name: &str,
    previous: Option<&Value>,
    value: &Value,
) -> Result<(), DomError> {
    trace!("[attributes] {node} {name} = {value:?}");
    match name {
        CLASS => host.set_class_name(node, value.as_str().unwrap_or("")),
        STYLE => {
            host.clear_style(node)?;
            for (property, v) in value.as_map().into_iter().flatten() {
                host.set_style(node, property, v)?;
            }
            Ok(())
        }
        DATASET => {
            let next = value.as_map();
            for key in previous.and_then(Value::as_map).into_iter().flatten().map(|(k, _)| k) {
                if next.is_none_or(|map| !map.contains_key(key)) {
                    host.remove_data(node, key)?;
                }
            }
            for (key, v) in next.into_iter().flatten() {
                host.set_data(node, key, v)?;
            }
            Ok(())
        }
        _ if value.is_nullish() => clear_plain(host, node, name),
        _ => {
            host.set_attribute(node, name, &value.to_attribute_string())?;
            if host.has_property(node, name) {
                host.set_property(node, name, value.clone())?;
            }
            Ok(())
        }
    }
}

/// Undo an attribute that is no longer declared.
pub fn clear<H: Host>(
    host: &mut H,
    node: NodeId,
    name: &str,
    previous: &Value,
) -> Result<(), DomError> {
    trace!("[attributes] {node} clear {name}");
    match name {
        CLASS => host.set_class_name(node, ""),
        STYLE => host.clear_style(node),
        DATASET => {
            for key in previous.as_map().into_iter().flatten().map(|(k, _)| k) {
                host.remove_data(node, key)?;
            }
            Ok(())
        }
        _ => clear_plain(host, node, name),
    }
}

fn clear_plain<H: Host>(host: &mut H, node: NodeId, name: &str) -> Result<(), DomError> {
    host.remove_attribute(node, name)?;
    if host.has_property(node, name) {
        host.set_property(node, name, Value::Null)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_dom::Document;

    fn attrs(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn map(pairs: &[(&str, &str)]) -> Value {
        Value::Map(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_apply_reserved_and_plain() {
        let mut doc = Document::new();
        let el = doc.create_element("input");
        apply(
            &mut doc,
            el,
            &attrs(&[
                ("class", "a b".into()),
                ("style", map(&[("color", "red")])),
                ("dataset", map(&[("todoId", "3")])),
                ("placeholder", "what?".into()),
                ("disabled", true.into()),
            ]),
        )
        .unwrap();

        assert_eq!(doc.attribute(el, "class").unwrap().as_deref(), Some("a b"));
        assert_eq!(doc.style(el, "color"), Some("red"));
        assert_eq!(doc.attribute(el, "data-todo-id").unwrap().as_deref(), Some("3"));
        assert_eq!(doc.attribute(el, "placeholder").unwrap().as_deref(), Some("what?"));
        assert_eq!(doc.property(el, "disabled").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_non_string_class_is_empty() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        update(&mut doc, el, "class", None, &Value::Bool(true)).unwrap();
        assert_eq!(doc.attribute(el, "class").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_style_replaces_whole_map() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let old = map(&[("color", "red"), ("margin", "0")]);
        update(&mut doc, el, "style", None, &old).unwrap();
        update(&mut doc, el, "style", Some(&old), &map(&[("color", "blue")])).unwrap();

        assert_eq!(doc.style(el, "color"), Some("blue"));
        assert_eq!(doc.style(el, "margin"), None);
        assert_eq!(doc.style_count(el), 1);
    }

    #[test]
    fn test_dataset_drops_stale_keys() {
        let mut doc = Document::new();
        let el = doc.create_element("li");
        let old = map(&[("a", "1"), ("b", "2")]);
        update(&mut doc, el, "dataset", None, &old).unwrap();
        update(&mut doc, el, "dataset", Some(&old), &map(&[("b", "3")])).unwrap();

        assert_eq!(doc.attribute(el, "data-a").unwrap(), None);
        assert_eq!(doc.attribute(el, "data-b").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_clear_resets_live_property() {
        let mut doc = Document::new();
        let el = doc.create_element("input");
        doc.set_attribute(el, "type", "checkbox").unwrap();
        update(&mut doc, el, "checked", None, &true.into()).unwrap();
        clear(&mut doc, el, "checked", &true.into()).unwrap();

        assert_eq!(doc.attribute(el, "checked").unwrap(), None);
        assert_eq!(doc.property(el, "checked").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_null_value_removes_attribute() {
        let mut doc = Document::new();
        let el = doc.create_element("a");
        update(&mut doc, el, "href", None, &"/x".into()).unwrap();
        update(&mut doc, el, "href", Some(&"/x".into()), &Value::Null).unwrap();
        assert_eq!(doc.attribute(el, "href").unwrap(), None);
    }
}
