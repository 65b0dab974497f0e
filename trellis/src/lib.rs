//! Virtual-tree reconciliation engine.
//!
//! Views describe the UI as a [`Node`] tree. The [`App`] render controller
//! turns every dispatched command into a new tree and reconciles it against
//! the previous one on a [`Host`](trellis_dom::Host), writing only what
//! changed.

pub mod app;
pub mod attributes;
pub mod destroy;
pub mod dispatcher;
pub mod error;
pub mod mount;
pub mod node;
pub mod patch;
pub mod prelude;

mod listeners;

pub use app::{App, AppBuilder, AppConfig, ErrorHook, Navigator, Reducer, RouteMapper, View};
pub use destroy::destroy;
pub use dispatcher::{AfterHook, CommandHandler, Dispatcher, Emitter, PanicHook, Subscription};
pub use error::{AppError, HandlerPanic, RenderError, StructuralError, extract_panic_message};
pub use mount::{mount, mount_before};
pub use node::{Child, Element, Fragment, Handler, Node, NodeKind, Props, Text};
pub use patch::patch;

pub use trellis_dom;

