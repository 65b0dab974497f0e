//! Error types for reconciliation, rendering and isolated handler panics.

use std::any::Any;

use thiserror::Error;
use trellis_dom::DomError;

use crate::node::NodeKind;

/// A structural precondition of mount/patch/destroy was violated, or the host
/// refused an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Patching requires the old node to own a concrete handle.
    #[error("cannot patch from an unmounted {kind} node")]
    Unmounted { kind: NodeKind },

    /// A node can be mounted at most once.
    #[error("{kind} node is already mounted")]
    AlreadyMounted { kind: NodeKind },

    #[error(transparent)]
    Host(#[from] DomError),
}

/// Why a render pass did not complete.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("view panicked: {0}")]
    ViewPanicked(String),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// The host was borrowed outside the app when the pass needed it.
    #[error("host is already borrowed")]
    HostBusy,

    /// A panic while applying the tree or delivering host events.
    #[error("render panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    /// Whether the live tree may have been partially rewritten.
    pub fn touched_tree(&self) -> bool {
        matches!(self, RenderError::Structural(_) | RenderError::Panicked(_))
    }
}

/// A user handler panicked and was isolated.
#[derive(Debug, Clone, Error)]
#[error("{origin} panicked: {message}")]
pub struct HandlerPanic {
    /// What ran the handler, e.g. `command 'addTodo'`.
    pub origin: String,
    pub message: String,
}

impl HandlerPanic {
    pub(crate) fn new(origin: impl Into<String>, panic: &(dyn Any + Send)) -> Self {
        Self {
            origin: origin.into(),
            message: extract_panic_message(panic),
        }
    }
}

/// Errors surfaced by an [`App`](crate::App), either returned from lifecycle
/// calls or passed to its `on_error` callback.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("app '{0}' is already mounted")]
    AlreadyMounted(&'static str),

    /// Unmounting releases every subscription, so an app mounts once.
    #[error("app '{0}' was unmounted and cannot be mounted again")]
    Released(&'static str),

    #[error("app '{app}' render failed: {source}")]
    Render {
        app: &'static str,
        #[source]
        source: RenderError,
    },

    #[error("app '{app}': {source}")]
    HandlerPanicked {
        app: &'static str,
        #[source]
        source: HandlerPanic,
    },
}

/// Extract a human-readable message from a panic payload.
///
/// Panics carry either `&str` or `String` payloads; anything else gets a
/// generic message.
pub fn extract_panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
