//! Live delivery to connected users.
//!
//! The [`ConnectionRegistry`] maps each user to at most one open [`DeliveryChannel`]. It is shared by every request
//! handler and every live session in the process and is safe to use from many tasks at once.
//!
//! A delivery channel is the sending half of an unbounded queue of text frames. Whoever owns the actual transport
//! (usually a WebSocket session) creates the channel, keeps the receiving half, and writes every frame it receives to
//! the socket. Everybody else only ever talks to the registry.
//!
//! Registering a second channel for the same user replaces the first one. The first transport is not closed; it just
//! stops receiving frames. Every registration is tagged with a [`ConnectionId`], and a session may only unregister
//! the registration it made itself, so a late cleanup from a replaced session can never evict its successor.
mod registry;

pub use registry::{ConnectionId, ConnectionRegistry, DeliveryChannel, DeliveryOutcome, Presence};
