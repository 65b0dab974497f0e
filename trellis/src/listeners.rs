//! Listener registry: installs declared handlers on concrete elements and
//! remembers them so they can be removed later.
//!
//! Handlers are wrapped before installation. A panicking handler is logged
//! and swallowed; it never reaches the host's event loop.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::error;
use trellis_dom::{DomError, Event, Host, Listener, ListenerId, NodeId};

use crate::error::extract_panic_message;
use crate::node::{Handler, Receipt, Registration};

/// Install every handler on `node` and return the receipt.
pub(crate) fn attach<H: Host>(
    host: &mut H,
    node: NodeId,
    handlers: &BTreeMap<String, Handler>,
) -> Result<Receipt, DomError> {
    reattach(host, node, handlers, &Receipt::new())
}

/// Install `handlers`, keeping registrations from `previous` whose handler is
/// the very same closure. Everything else is installed fresh, replacing the
/// host's listener for that event.
pub(crate) fn reattach<H: Host>(
    host: &mut H,
    node: NodeId,
    handlers: &BTreeMap<String, Handler>,
    previous: &Receipt,
) -> Result<Receipt, DomError> {
    let mut receipt = Receipt::new();
    for (event, handler) in handlers {
        if let Some(existing) = previous.get(event)
            && Rc::ptr_eq(&existing.handler, handler)
        {
            receipt.insert(event.clone(), existing.clone());
            continue;
        }
        let id = ListenerId::next();
        host.add_listener(node, event, id, isolate(event, handler.clone()))?;
        receipt.insert(
            event.clone(),
            Registration {
                id,
                handler: handler.clone(),
            },
        );
    }
    Ok(receipt)
}

/// Remove every listener the receipt names.
pub(crate) fn detach<H: Host>(
    host: &mut H,
    node: NodeId,
    receipt: &Receipt,
) -> Result<(), DomError> {
    for (event, registration) in receipt {
        host.remove_listener(node, event, registration.id)?;
    }
    Ok(())
}

fn isolate(event: &str, handler: Handler) -> Listener {
    let event = event.to_string();
    Rc::new(move |e: &Event| {
        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(e))) {
            error!(
                "[listeners] '{}' handler on {} panicked: {}",
                event,
                e.current_target(),
                extract_panic_message(panic.as_ref())
            );
        }
    })
}
