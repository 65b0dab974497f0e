//! Render controller: owns the state, the current tree and the root, and
//! re-renders after every dispatched command.
//!
//! At most one render runs at a time. A render requested while one is in
//! flight (typically from a focus listener fired by focus restoration) is
//! skipped, not queued.

mod config;
mod focus;
mod navigator;

pub use config::AppConfig;
pub use navigator::Navigator;

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{debug, error, info, trace, warn};
use trellis_dom::{Host, NodeId};

use crate::destroy::destroy;
use crate::dispatcher::{Dispatcher, Emitter, Subscription};
use crate::error::{AppError, HandlerPanic, RenderError, extract_panic_message};
use crate::mount::mount;
use crate::node::Node;
use crate::patch::patch;

use focus::FocusContext;

/// Pure function from state to a tree.
pub type View<S, P> = dyn Fn(&S, &Emitter<P>, &Navigator) -> Node;
/// Pure function from state and payload to the next state.
pub type Reducer<S, P> = dyn Fn(&S, &P) -> S;
/// Receives render failures and isolated handler panics.
pub type ErrorHook = Rc<dyn Fn(&AppError)>;
/// Builds the route command's payload from a path.
pub type RouteMapper<P> = Rc<dyn Fn(&str) -> P>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Mounted,
    Released,
}

struct Inner<S, P, H> {
    config: AppConfig,
    host: Rc<RefCell<H>>,
    state: Rc<RefCell<S>>,
    view: Box<View<S, P>>,
    dispatcher: Dispatcher<P>,
    navigator: Navigator,
    route: Option<(String, RouteMapper<P>)>,
    on_error: Option<ErrorHook>,
    subscriptions: RefCell<Vec<Subscription>>,
    tree: RefCell<Option<Node>>,
    root: Cell<Option<NodeId>>,
    phase: Cell<Phase>,
    rendering: Cell<bool>,
    renders: Cell<usize>,
}

/// A mounted application.
///
/// ```ignore
/// let app = AppBuilder::new(0_i64, |count, emit, _| {
///     let emit = emit.clone();
///     Element::new("button")
///         .on("click", move |_| emit.emit("increment", ()))
///         .child(count.to_string())
///         .into()
/// })
/// .reducer("increment", |count, _| count + 1)
/// .build(host);
/// app.mount(root)?;
/// ```
pub struct App<S, P, H> {
    inner: Rc<Inner<S, P, H>>,
}

impl<S, P, H> Clone for App<S, P, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: 'static, P: 'static, H: Host + 'static> App<S, P, H> {
    /// Attach to `root` and perform the initial render.
    pub fn mount(&self, root: NodeId) -> Result<(), AppError> {
        let inner = &self.inner;
        match inner.phase.get() {
            Phase::Mounted => return Err(AppError::AlreadyMounted(inner.config.name)),
            Phase::Released => return Err(AppError::Released(inner.config.name)),
            Phase::Idle => {}
        }
        inner.root.set(Some(root));
        inner.phase.set(Phase::Mounted);

        if let Some((command, to_payload)) = &inner.route {
            let emitter = inner.dispatcher.emitter();
            let command = command.clone();
            let to_payload = to_payload.clone();
            inner
                .navigator
                .listen(Rc::new(move |path: &str| emitter.emit(&command, to_payload(path))));
        }

        info!("[{}] mounted at {root}", inner.config.name);
        inner.render();
        Ok(())
    }

    /// Destroy the tree and release every subscription and the route hook.
    pub fn unmount(&self) {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Mounted {
            return;
        }
        let tree = inner.tree.borrow_mut().take();
        if let Some(mut tree) = tree
            && let Err(e) = destroy(&mut *inner.host.borrow_mut(), &mut tree)
        {
            error!("[{}] teardown failed: {e}", inner.config.name);
        }
        inner.navigator.stop_listening();
        for subscription in inner.subscriptions.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        inner.root.set(None);
        inner.phase.set(Phase::Released);
        info!("[{}] unmounted", inner.config.name);
    }

    /// Render now. Skipped while another render is in flight.
    pub fn render(&self) {
        self.inner.render();
    }

    pub fn emit(&self, command: &str, payload: P) {
        self.inner.dispatcher.dispatch(command, payload);
    }

    pub fn emitter(&self) -> Emitter<P> {
        self.inner.dispatcher.emitter()
    }

    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.inner.dispatcher
    }

    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// Current state. Release the borrow before emitting.
    pub fn state(&self) -> Ref<'_, S> {
        self.inner.state.borrow()
    }

    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.inner.host
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.phase.get() == Phase::Mounted
    }

    pub fn is_rendering(&self) -> bool {
        self.inner.rendering.get()
    }

    /// Completed render passes.
    pub fn render_count(&self) -> usize {
        self.inner.renders.get()
    }
}

impl<S, P, H> fmt::Debug for App<S, P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.inner.config.name)
            .field("phase", &self.inner.phase.get())
            .field("root", &self.inner.root.get())
            .field("renders", &self.inner.renders.get())
            .finish()
    }
}

/// Clears the in-flight flag however the pass ends.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S: 'static, P: 'static, H: Host + 'static> Inner<S, P, H> {
    fn render(&self) {
        let Some(root) = self.root.get() else {
            debug!("[{}] render before mount ignored", self.config.name);
            return;
        };
        if self.rendering.replace(true) {
            debug!("[{}] render already in flight, skipped", self.config.name);
            return;
        }
        let _in_flight = InFlight(&self.rendering);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.reconcile(root)))
            .unwrap_or_else(|panic| {
                Err(RenderError::Panicked(extract_panic_message(panic.as_ref())))
            });
        match outcome {
            Ok(()) => {
                self.renders.set(self.renders.get() + 1);
                trace!("[{}] render #{} done", self.config.name, self.renders.get());
            }
            Err(e) => {
                error!("[{}] render failed: {e}", self.config.name);
                if e.touched_tree() {
                    self.discard_tree();
                }
                self.report(AppError::Render {
                    app: self.config.name,
                    source: e,
                });
            }
        }

        // Host events queued during reconciliation (focus, blur) run while
        // the flag is still set; their commands update state without
        // re-rendering.
        if let Err(e) = self.deliver_pending() {
            error!("[{}] host event failed: {e}", self.config.name);
            self.report(AppError::Render {
                app: self.config.name,
                source: e,
            });
        }
    }

    fn reconcile(&self, root: NodeId) -> Result<(), RenderError> {
        let focus = if self.config.restore_focus {
            let host = self.host.try_borrow().map_err(|_| RenderError::HostBusy)?;
            FocusContext::capture(&*host, root, &self.config.identity_attribute)
        } else {
            None
        };

        let mut next = self.compute_view()?;

        let mut host = self
            .host
            .try_borrow_mut()
            .map_err(|_| RenderError::HostBusy)?;
        let mut tree = self.tree.borrow_mut();
        let applied = panic::catch_unwind(AssertUnwindSafe(|| match tree.as_mut() {
            None => mount(&mut *host, &mut next, root),
            Some(current) => patch(&mut *host, Some(current), Some(&mut next), root),
        }));
        let result = match applied {
            Ok(result) => result.map_err(RenderError::from),
            Err(panic) => Err(RenderError::Panicked(extract_panic_message(panic.as_ref()))),
        };
        if let Err(e) = result {
            // Keep whatever the failed pass mounted so it can be discarded.
            let stale = tree.replace(next);
            if let Some(mut stale) = stale
                && let Err(teardown) = destroy(&mut *host, &mut stale)
            {
                warn!("[{}] partial teardown: {teardown}", self.config.name);
            }
            return Err(e);
        }
        *tree = Some(next);

        if let Some(focus) = focus
            && let Some(current) = tree.as_ref()
            && let Err(e) = focus.restore(&mut *host, current, &self.config.identity_attribute)
        {
            warn!("[{}] focus restore failed: {e}", self.config.name);
        }
        Ok(())
    }

    fn compute_view(&self) -> Result<Node, RenderError> {
        let emitter = self.dispatcher.emitter();
        let state = self.state.borrow();
        panic::catch_unwind(AssertUnwindSafe(|| {
            (self.view)(&*state, &emitter, &self.navigator)
        }))
        .map_err(|panic| RenderError::ViewPanicked(extract_panic_message(panic.as_ref())))
    }

    /// Destroy the nodes the current tree owns so the next render mounts
    /// fresh. Nodes the app did not mount stay where they are.
    fn discard_tree(&self) {
        let Ok(mut host) = self.host.try_borrow_mut() else {
            warn!("[{}] host busy, keeping current tree", self.config.name);
            return;
        };
        if let Some(mut tree) = self.tree.borrow_mut().take()
            && let Err(e) = destroy(&mut *host, &mut tree)
        {
            warn!("[{}] partial teardown: {e}", self.config.name);
        }
    }

    /// Events stay queued when the host is borrowed elsewhere; the next pass
    /// delivers them.
    fn deliver_pending(&self) -> Result<(), RenderError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            loop {
                let pending = match self.host.try_borrow_mut() {
                    Ok(mut host) => host.take_pending_events(),
                    Err(_) => {
                        warn!("[{}] host busy, host events deferred", self.config.name);
                        return;
                    }
                };
                if pending.is_empty() {
                    return;
                }
                for event in pending {
                    event.deliver();
                }
            }
        }))
        .map_err(|panic| RenderError::Panicked(extract_panic_message(panic.as_ref())))
    }

    fn report(&self, err: AppError) {
        if let Some(hook) = &self.on_error {
            hook(&err);
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct AppBuilder<S, P> {
    state: S,
    view: Box<View<S, P>>,
    reducers: Vec<(String, Box<Reducer<S, P>>)>,
    route: Option<(String, RouteMapper<P>)>,
    config: AppConfig,
    on_error: Option<ErrorHook>,
}

impl<S: 'static, P: 'static> AppBuilder<S, P> {
    pub fn new(state: S, view: impl Fn(&S, &Emitter<P>, &Navigator) -> Node + 'static) -> Self {
        Self {
            state,
            view: Box::new(view),
            reducers: Vec::new(),
            route: None,
            config: AppConfig::default(),
            on_error: None,
        }
    }

    /// Register a reducer for `command`. A panicking reducer leaves the state
    /// untouched.
    pub fn reducer(
        mut self,
        command: impl Into<String>,
        reducer: impl Fn(&S, &P) -> S + 'static,
    ) -> Self {
        self.reducers.push((command.into(), Box::new(reducer)));
        self
    }

    /// Dispatch `command` with a payload built from the path whenever the
    /// navigator moves, while mounted.
    pub fn on_navigate(
        mut self,
        command: impl Into<String>,
        to_payload: impl Fn(&str) -> P + 'static,
    ) -> Self {
        self.route = Some((command.into(), Rc::new(to_payload)));
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&AppError) + 'static) -> Self {
        self.on_error = Some(Rc::new(hook));
        self
    }

    pub fn build<H: Host + 'static>(self, host: Rc<RefCell<H>>) -> App<S, P, H> {
        let dispatcher = Dispatcher::new();
        let state = Rc::new(RefCell::new(self.state));
        let name = self.config.name;

        let mut subscriptions = Vec::with_capacity(self.reducers.len() + 1);
        for (command, reducer) in self.reducers {
            let state = state.clone();
            let handler = Rc::new(move |payload: &P| {
                let next = reducer(&*state.borrow(), payload);
                *state.borrow_mut() = next;
            });
            subscriptions.push(dispatcher.subscribe(&command, handler));
        }

        if let Some(hook) = self.on_error.clone() {
            dispatcher.on_panic(Rc::new(move |panic: &HandlerPanic| {
                hook(&AppError::HandlerPanicked {
                    app: name,
                    source: panic.clone(),
                })
            }));
        }

        let inner = Rc::new(Inner {
            navigator: Navigator::new(self.config.initial_location.clone()),
            config: self.config,
            host,
            state,
            view: self.view,
            dispatcher,
            route: self.route,
            on_error: self.on_error,
            subscriptions: RefCell::new(Vec::new()),
            tree: RefCell::new(None),
            root: Cell::new(None),
            phase: Cell::new(Phase::Idle),
            rendering: Cell::new(false),
            renders: Cell::new(0),
        });

        let weak = Rc::downgrade(&inner);
        subscriptions.push(inner.dispatcher.after_every_command(Rc::new(move |command: &str| {
            if let Some(inner) = weak.upgrade() {
                trace!("[{}] '{command}' dispatched, rendering", inner.config.name);
                inner.render();
            }
        })));
        *inner.subscriptions.borrow_mut() = subscriptions;

        App { inner }
    }
}

impl<S, P> fmt::Debug for AppBuilder<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("config", &self.config)
            .field("reducers", &self.reducers.iter().map(|(c, _)| c).collect::<Vec<_>>())
            .finish()
    }
}
