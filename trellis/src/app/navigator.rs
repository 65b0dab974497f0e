//! Current location plus the hook that turns navigation into a command.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

type RouteHook = Rc<dyn Fn(&str)>;

struct Inner {
    location: RefCell<String>,
    hook: RefCell<Option<RouteHook>>,
}

/// Cloneable handle to the app's location.
///
/// While the app is mounted, every [`navigate`](Self::navigate) dispatches
/// the app's route command with the new path.
#[derive(Clone)]
pub struct Navigator {
    inner: Rc<Inner>,
}

impl Navigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                location: RefCell::new(initial.into()),
                hook: RefCell::new(None),
            }),
        }
    }

    pub fn location(&self) -> String {
        self.inner.location.borrow().clone()
    }

    pub fn navigate(&self, path: &str) {
        *self.inner.location.borrow_mut() = path.to_string();
        let hook = self.inner.hook.borrow().clone();
        match hook {
            Some(hook) => hook(path),
            None => debug!("[navigator] {path} (no route hook)"),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.inner.hook.borrow().is_some()
    }

    pub(crate) fn listen(&self, hook: RouteHook) {
        *self.inner.hook.borrow_mut() = Some(hook);
    }

    pub(crate) fn stop_listening(&self) {
        self.inner.hook.borrow_mut().take();
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("location", &*self.inner.location.borrow())
            .field("listening", &self.is_listening())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_updates_location_and_calls_hook() {
        let nav = Navigator::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        nav.navigate("/ignored");
        nav.listen(Rc::new(move |p: &str| sink.borrow_mut().push(p.to_string())));
        nav.navigate("/active");
        nav.stop_listening();
        nav.navigate("/done");

        assert_eq!(nav.location(), "/done");
        assert_eq!(*seen.borrow(), vec!["/active"]);
    }
}
