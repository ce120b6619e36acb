//! DevMarket Engine
//!
//! The DevMarket engine holds the core logic of a freelance marketplace: clients buy gigs from freelancers, pay
//! out-of-band, upload a proof of payment, and the order then moves through a fixed lifecycle until the client approves
//! the delivered work. Participants can message each other, and messages are pushed live to recipients that are
//! connected.
//!
//! The library is divided into the following sections:
//! 1. Data types ([`mod@db_types`]) and the order lifecycle ([`mod@transitions`]), a fixed table of the allowed status
//!    changes.
//! 2. Backend traits ([`mod@traits`]) and the SQLite implementation of them ([`SqliteDatabase`]). You should never need
//!    to access the database directly. Use the public API instead.
//! 3. The public API ([`mod@dm_api`]): [`OrderFlowApi`], [`MessageDispatcher`], [`ReviewApi`] and [`ProfileApi`].
//! 4. Live delivery ([`mod@connections`]): a process-wide registry mapping each user to at most one open delivery
//!    channel.
//!
//! The engine also emits events when order statuses change. Hooks subscribe to these events through
//! [`events::EventHooks`]; the [`events::OrderEventNotifier`] is one such hook and pushes status changes to connected
//! participants.
pub mod connections;
pub mod db_types;
pub mod dm_api;
pub mod events;
pub mod traits;
pub mod transitions;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use connections::{ConnectionId, ConnectionRegistry, DeliveryChannel, DeliveryOutcome, Presence};
pub use dm_api::{
    message_dispatcher::MessageDispatcher,
    objects,
    order_flow_api::OrderFlowApi,
    profile_api::ProfileApi,
    review_api::ReviewApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use transitions::{Transition, TransitionError, TransitionTable};
