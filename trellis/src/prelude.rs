//! Prelude module for convenient imports.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```

pub use crate::app::{App, AppBuilder, AppConfig, Navigator};
pub use crate::dispatcher::Emitter;
pub use crate::node::{Child, Element, Node, Props};

pub use trellis_dom::{Document, Event, Host, NodeId, Value};
