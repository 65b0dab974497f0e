//! Command dispatcher: a synchronous publish/subscribe bus keyed by command
//! name.
//!
//! Handlers for one command run in subscription order, then every
//! after-command hook runs with the command name. A panicking handler is
//! isolated: it is logged and reported, and the remaining handlers still run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{debug, error, trace};

use crate::error::HandlerPanic;

/// Handler for one command's payload.
pub type CommandHandler<P> = Rc<dyn Fn(&P)>;
/// Hook run after every dispatched command, receiving its name.
pub type AfterHook = Rc<dyn Fn(&str)>;
/// Receives isolated handler panics.
pub type PanicHook = Rc<dyn Fn(&HandlerPanic)>;

struct Registry<P> {
    next_id: u64,
    commands: HashMap<String, Vec<(u64, CommandHandler<P>)>>,
    after: Vec<(u64, AfterHook)>,
    on_panic: Option<PanicHook>,
}

impl<P> Registry<P> {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct Dispatcher<P> {
    registry: Rc<RefCell<Registry<P>>>,
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<P: 'static> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("Dispatcher")
            .field("commands", &registry.commands.keys().collect::<Vec<_>>())
            .field("after", &registry.after.len())
            .finish()
    }
}

impl<P: 'static> Dispatcher<P> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                commands: HashMap::new(),
                after: Vec::new(),
                on_panic: None,
            })),
        }
    }

    /// Register a handler for `command`.
    ///
    /// Subscribing the same handler (same `Rc`) twice to one command is a
    /// no-op; the returned subscription then releases nothing.
    pub fn subscribe(&self, command: &str, handler: CommandHandler<P>) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        let handlers = registry.commands.entry(command.to_string()).or_default();
        if handlers.iter().any(|(_, h)| Rc::ptr_eq(h, &handler)) {
            debug!("[dispatcher] '{command}' handler already subscribed");
            return Subscription::noop();
        }
        handlers.push((id, handler));
        trace!("[dispatcher] subscribe '{command}' (#{id})");

        let registry = Rc::downgrade(&self.registry);
        let command = command.to_string();
        Subscription::new(move || {
            release(&registry, |r| {
                if let Some(handlers) = r.commands.get_mut(&command) {
                    handlers.retain(|(other, _)| *other != id);
                    if handlers.is_empty() {
                        r.commands.remove(&command);
                    }
                }
            })
        })
    }

    /// Register a hook that runs after every dispatched command.
    pub fn after_every_command(&self, hook: AfterHook) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.after.push((id, hook));

        let registry = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            release(&registry, |r| r.after.retain(|(other, _)| *other != id))
        })
    }

    /// Route isolated panics to `hook` in addition to the log.
    pub fn on_panic(&self, hook: PanicHook) {
        self.registry.borrow_mut().on_panic = Some(hook);
    }

    /// Run every handler for `command`, then every after-command hook.
    ///
    /// The handler lists are snapshotted first, so handlers may subscribe,
    /// unsubscribe or dispatch again while running.
    pub fn dispatch(&self, command: &str, payload: P) {
        let (handlers, after) = {
            let registry = self.registry.borrow();
            let handlers: Vec<_> = registry
                .commands
                .get(command)
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default();
            let after: Vec<_> = registry.after.iter().map(|(_, h)| h.clone()).collect();
            (handlers, after)
        };
        debug!(
            "[dispatcher] dispatch '{command}' ({} handlers, {} hooks)",
            handlers.len(),
            after.len()
        );

        for handler in handlers {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(&payload))) {
                self.report(HandlerPanic::new(format!("command '{command}'"), panic.as_ref()));
            }
        }
        for hook in after {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| hook(command))) {
                self.report(HandlerPanic::new(
                    format!("after-command hook for '{command}'"),
                    panic.as_ref(),
                ));
            }
        }
    }

    pub fn subscriber_count(&self, command: &str) -> usize {
        self.registry.borrow().commands.get(command).map_or(0, Vec::len)
    }

    pub fn after_hook_count(&self) -> usize {
        self.registry.borrow().after.len()
    }

    /// Drop every handler and hook.
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.commands.clear();
        registry.after.clear();
    }

    pub fn emitter(&self) -> Emitter<P> {
        Emitter {
            dispatcher: self.clone(),
        }
    }

    fn report(&self, panic: HandlerPanic) {
        error!("[dispatcher] {panic}");
        let hook = self.registry.borrow().on_panic.clone();
        if let Some(hook) = hook {
            hook(&panic);
        }
    }
}

fn release<P>(registry: &Weak<RefCell<Registry<P>>>, f: impl FnOnce(&mut Registry<P>)) {
    if let Some(registry) = registry.upgrade() {
        f(&mut registry.borrow_mut());
    }
}

/// Handle returned by [`Dispatcher::subscribe`].
///
/// Dropping it keeps the handler registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "dropping a Subscription keeps the handler registered"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    fn noop() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Cloneable sending half handed to views and handlers.
pub struct Emitter<P> {
    dispatcher: Dispatcher<P>,
}

impl<P> Clone for Emitter<P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<P: 'static> Emitter<P> {
    pub fn emit(&self, command: &str, payload: P) {
        self.dispatcher.dispatch(command, payload);
    }
}
