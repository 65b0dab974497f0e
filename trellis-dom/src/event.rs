use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::NodeId;

/// A callback registered on a node for one event name.
pub type Listener = Rc<dyn Fn(&Event)>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a registered listener. Removal only succeeds when the id matches
/// the listener currently installed, so stale receipts are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Home,
    End,
}

impl Key {
    /// Whether the key produces a `keypress` event in addition to `keydown`.
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Char(_) | Key::Enter)
    }
}

/// The event object handed to listeners.
///
/// `value` and `checked` are snapshots of the target's live properties taken
/// when the event was created, standing in for `event.target.value`.
pub struct Event {
    name: String,
    target: NodeId,
    current_target: Cell<NodeId>,
    value: Option<String>,
    checked: Option<bool>,
    key: Option<Key>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            current_target: Cell::new(target),
            value: None,
            checked: None,
            key: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is currently running (differs from `target`
    /// while bubbling).
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    /// The target's value at the time the event was raised, or "".
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("value", &self.value)
            .field("checked", &self.checked)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// An event raised by a host mutation (focus changes) whose delivery was
/// postponed until the host is no longer borrowed.
pub struct PendingEvent {
    pub listener: Listener,
    pub event: Event,
}

impl PendingEvent {
    pub fn deliver(self) {
        (self.listener)(&self.event);
    }
}

impl fmt::Debug for PendingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PendingEvent({:?})", self.event)
    }
}
