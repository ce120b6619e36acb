//! Simple stateless pub-sub event handler
//!
//! Components of the system subscribe to engine events through [`EventHooks`] and react to them. The handlers have no
//! access to the internal state of the engine; all they receive is the event itself. Handlers can be async.
mod channel;
mod event_types;
mod hooks;
mod notifier;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
pub use notifier::OrderEventNotifier;
