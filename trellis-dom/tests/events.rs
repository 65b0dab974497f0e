use std::cell::RefCell;
use std::rc::Rc;

use trellis_dom::interact::{click, fire, focus, press_key, type_text};
use trellis_dom::{Document, Event, Host, Key, ListenerId, NodeId};

fn setup() -> (Rc<RefCell<Document>>, NodeId, NodeId) {
    let doc = Rc::new(RefCell::new(Document::new()));
    let (form, input) = {
        let mut d = doc.borrow_mut();
        let body = d.body();
        let form = d.create_element("form");
        let input = d.create_element("input");
        d.append_child(body, form).unwrap();
        d.append_child(form, input).unwrap();
        (form, input)
    };
    (doc, form, input)
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> trellis_dom::Listener) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let make = move |label: &str| -> trellis_dom::Listener {
        let sink = sink.clone();
        let label = label.to_string();
        Rc::new(move |e: &Event| sink.borrow_mut().push(format!("{label}:{}", e.name())))
    };
    (log, make)
}

// ============================================================================
// Listener Registration
// ============================================================================

#[test]
fn test_add_listener_replaces_same_event() {
    let (doc, _, input) = setup();
    let (log, make) = recorder();
    let first = ListenerId::next();
    let second = ListenerId::next();
    doc.borrow_mut().add_listener(input, "click", first, make("first")).unwrap();
    doc.borrow_mut().add_listener(input, "click", second, make("second")).unwrap();

    click(&doc, input).unwrap();
    assert_eq!(*log.borrow(), vec!["second:click"]);
    assert_eq!(doc.borrow().listener_count(input), 1);
}

#[test]
fn test_remove_listener_requires_matching_id() {
    let (doc, _, input) = setup();
    let (_, make) = recorder();
    let stale = ListenerId::next();
    let current = ListenerId::next();
    doc.borrow_mut().add_listener(input, "click", current, make("x")).unwrap();

    assert!(!doc.borrow_mut().remove_listener(input, "click", stale).unwrap());
    assert!(doc.borrow().has_listener(input, "click"));
    assert!(doc.borrow_mut().remove_listener(input, "click", current).unwrap());
    assert!(!doc.borrow().has_listener(input, "click"));
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_events_bubble_to_ancestors() {
    let (doc, form, input) = setup();
    let (log, make) = recorder();
    doc.borrow_mut().add_listener(input, "click", ListenerId::next(), make("input")).unwrap();
    doc.borrow_mut().add_listener(form, "click", ListenerId::next(), make("form")).unwrap();

    click(&doc, input).unwrap();
    assert_eq!(*log.borrow(), vec!["input:click", "form:click"]);
}

#[test]
fn test_stop_propagation() {
    let (doc, form, input) = setup();
    let (log, make) = recorder();
    doc.borrow_mut()
        .add_listener(input, "click", ListenerId::next(), Rc::new(|e: &Event| e.stop_propagation()))
        .unwrap();
    doc.borrow_mut().add_listener(form, "click", ListenerId::next(), make("form")).unwrap();

    click(&doc, input).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_listener_can_mutate_document() {
    let (doc, form, input) = setup();
    let handle = doc.clone();
    doc.borrow_mut()
        .add_listener(
            input,
            "click",
            ListenerId::next(),
            Rc::new(move |_: &Event| {
                let mut d = handle.borrow_mut();
                let note = d.create_text("clicked");
                d.append_child(form, note).unwrap();
            }),
        )
        .unwrap();

    click(&doc, input).unwrap();
    assert_eq!(doc.borrow().text_content(form), "clicked");
}

#[test]
fn test_prevent_default_reported() {
    let (doc, _, input) = setup();
    doc.borrow_mut()
        .add_listener(input, "click", ListenerId::next(), Rc::new(|e: &Event| e.prevent_default()))
        .unwrap();

    let event = doc.borrow().event("click", input);
    assert!(!fire(&doc, event));
}

// ============================================================================
// Focus and Text Input
// ============================================================================

#[test]
fn test_focus_events_delivered_after_borrow() {
    let (doc, form, input) = setup();
    let other = {
        let mut d = doc.borrow_mut();
        let other = d.create_element("button");
        d.append_child(form, other).unwrap();
        other
    };
    let (log, make) = recorder();
    doc.borrow_mut().add_listener(input, "focus", ListenerId::next(), make("input")).unwrap();
    doc.borrow_mut().add_listener(input, "blur", ListenerId::next(), make("input")).unwrap();

    focus(&doc, input).unwrap();
    focus(&doc, input).unwrap();
    focus(&doc, other).unwrap();

    assert_eq!(*log.borrow(), vec!["input:focus", "input:blur"]);
    assert_eq!(doc.borrow().focused(), Some(other));
}

#[test]
fn test_type_text_fires_input_with_value() {
    let (doc, _, input) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    doc.borrow_mut()
        .add_listener(
            input,
            "input",
            ListenerId::next(),
            Rc::new(move |e: &Event| sink.borrow_mut().push(e.value().to_string())),
        )
        .unwrap();

    type_text(&doc, input, "ab").unwrap();
    assert_eq!(*seen.borrow(), vec!["a", "ab"]);
    assert_eq!(doc.borrow().focused(), Some(input));
    assert_eq!(doc.borrow().selection(input).unwrap(), Some((2, 2)));
}

#[test]
fn test_typing_inserts_at_caret() {
    let (doc, _, input) = setup();
    doc.borrow_mut()
        .set_property(input, "value", "hello".into())
        .unwrap();
    focus(&doc, input).unwrap();
    doc.borrow_mut().set_selection(input, 3, 3).unwrap();

    type_text(&doc, input, "x").unwrap();
    assert_eq!(doc.borrow().property(input, "value").unwrap(), "helxlo".into());
    assert_eq!(doc.borrow().selection(input).unwrap(), Some((4, 4)));
}

#[test]
fn test_keypress_prevent_default_blocks_edit() {
    let (doc, _, input) = setup();
    doc.borrow_mut()
        .add_listener(
            input,
            "keypress",
            ListenerId::next(),
            Rc::new(|e: &Event| {
                if e.key() == Some(Key::Char('!')) {
                    e.prevent_default();
                }
            }),
        )
        .unwrap();

    type_text(&doc, input, "a!b").unwrap();
    assert_eq!(doc.borrow().property(input, "value").unwrap(), "ab".into());
}

#[test]
fn test_backspace_edits_and_fires_input() {
    let (doc, _, input) = setup();
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    doc.borrow_mut()
        .add_listener(
            input,
            "input",
            ListenerId::next(),
            Rc::new(move |_: &Event| *sink.borrow_mut() += 1),
        )
        .unwrap();
    doc.borrow_mut().set_property(input, "value", "ab".into()).unwrap();

    assert!(press_key(&doc, input, Key::Backspace).unwrap());
    press_key(&doc, input, Key::Home).unwrap();
    press_key(&doc, input, Key::Backspace).unwrap();

    assert_eq!(doc.borrow().property(input, "value").unwrap(), "a".into());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_checkbox_click_toggles_and_changes() {
    let (doc, form, _) = setup();
    let checkbox = {
        let mut d = doc.borrow_mut();
        let checkbox = d.create_element("input");
        d.set_attribute(checkbox, "type", "checkbox").unwrap();
        d.append_child(form, checkbox).unwrap();
        checkbox
    };
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    doc.borrow_mut()
        .add_listener(
            checkbox,
            "change",
            ListenerId::next(),
            Rc::new(move |e: &Event| sink.borrow_mut().push(e.checked())),
        )
        .unwrap();

    click(&doc, checkbox).unwrap();
    click(&doc, checkbox).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(true), Some(false)]);
}
