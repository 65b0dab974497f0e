pub mod document;
pub mod error;
pub mod event;
pub mod focus;
pub mod host;
pub mod interact;
pub mod journal;
pub mod node;
pub mod text_input;
pub mod value;

mod html;
mod query;

pub use document::{data_attribute_name, Document};
pub use error::DomError;
pub use event::{Event, Key, Listener, ListenerId, PendingEvent};
pub use focus::FocusState;
pub use host::Host;
pub use journal::Mutation;
pub use node::NodeId;
pub use text_input::TextInputData;
pub use value::Value;
