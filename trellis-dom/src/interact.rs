//! Simulated user interaction.
//!
//! Listeners may re-enter whatever owns the document (a render that mutates
//! it), so these helpers take the shared `RefCell` and never hold a borrow
//! while a listener runs.

use std::cell::RefCell;

use log::debug;

use crate::document::Document;
use crate::error::DomError;
use crate::event::{Event, Key};
use crate::host::Host;
use crate::node::NodeId;

/// Deliver an event to the target and its ancestors (bubbling).
/// Returns false if a listener called `prevent_default`.
pub fn fire(doc: &RefCell<Document>, event: Event) -> bool {
    let path = doc.borrow().propagation_path(event.target(), event.name());
    debug!(
        "[interact] fire {} at {} ({} listeners)",
        event.name(),
        event.target(),
        path.len()
    );
    for (node, listener) in path {
        event.set_current_target(node);
        listener(&event);
        if event.propagation_stopped() {
            break;
        }
    }
    deliver_pending(doc);
    !event.default_prevented()
}

/// Deliver focus/blur events queued by earlier mutations.
pub fn deliver_pending(doc: &RefCell<Document>) {
    loop {
        let pending = doc.borrow_mut().take_pending_events();
        if pending.is_empty() {
            break;
        }
        for event in pending {
            event.deliver();
        }
    }
}

/// Move focus to `node`, delivering `blur`/`focus` listeners.
pub fn focus(doc: &RefCell<Document>, node: NodeId) -> Result<(), DomError> {
    doc.borrow_mut().focus(node)?;
    deliver_pending(doc);
    Ok(())
}

/// Click a node. Checkboxes and radios toggle first and then also receive
/// `change`.
pub fn click(doc: &RefCell<Document>, node: NodeId) -> Result<bool, DomError> {
    let toggled = doc.borrow_mut().toggle_checked(node)?;
    let event = doc.borrow().event("click", node);
    let proceed = fire(doc, event);
    if toggled.is_some() {
        let change = doc.borrow().event("change", node);
        fire(doc, change);
    }
    Ok(proceed)
}

/// Press a key on a node.
///
/// Fires `keydown`, then `keypress` for printable keys. Unless a listener
/// prevented the default, text controls apply the edit and fire `input` when
/// their value changed.
pub fn press_key(doc: &RefCell<Document>, node: NodeId, key: Key) -> Result<bool, DomError> {
    let keydown = doc.borrow().event("keydown", node).with_key(key);
    let mut proceed = fire(doc, keydown);
    if proceed && key.is_printable() {
        let keypress = doc.borrow().event("keypress", node).with_key(key);
        proceed = fire(doc, keypress);
    }
    if !proceed {
        return Ok(false);
    }

    let is_text_control = doc.borrow().selection(node)?.is_some();
    if !is_text_control {
        return Ok(true);
    }
    let changed = doc.borrow_mut().with_input(node, |input| match key {
        Key::Char(c) => {
            input.insert(c.encode_utf8(&mut [0; 4]));
            true
        }
        Key::Backspace => input.delete_back(),
        Key::Delete => input.delete_forward(),
        Key::Left => {
            input.move_cursor(-1);
            false
        }
        Key::Right => {
            input.move_cursor(1);
            false
        }
        Key::Home => {
            input.move_to_start();
            false
        }
        Key::End => {
            input.move_to_end();
            false
        }
        Key::Enter | Key::Tab | Key::Escape => false,
    })?;
    if changed {
        let input = doc.borrow().event("input", node);
        fire(doc, input);
    }
    Ok(true)
}

/// Focus a text control and type `text` one character at a time at the caret.
pub fn type_text(doc: &RefCell<Document>, node: NodeId, text: &str) -> Result<(), DomError> {
    if doc.borrow().focused() != Some(node) {
        focus(doc, node)?;
    }
    for c in text.chars() {
        press_key(doc, node, Key::Char(c))?;
    }
    Ok(())
}
