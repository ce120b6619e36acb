use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use dashmap::DashMap;
use log::*;
use tokio::sync::mpsc;

use crate::db_types::UserId;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique tag for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// The sending half of a live connection.
#[derive(Debug, Clone)]
pub struct DeliveryChannel {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl DeliveryChannel {
    /// Creates a channel with a fresh [`ConnectionId`]. The receiver must be drained by the transport.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { id: ConnectionId::next(), sender }, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// The result of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online(ConnectionId),
    Offline,
}

/// The result of trying to push a frame to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The frame was handed to the user's live connection.
    Delivered(ConnectionId),
    /// The user has no live connection.
    Offline,
    /// The user's connection closed before the frame could be handed over. The stale registration has been removed.
    Failed(ConnectionId),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}

/// Maps each user to their current live connection, if any.
///
/// Cloning is cheap. All clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<UserId, DeliveryChannel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `channel` the user's live connection, replacing any previous one.
    pub fn register(&self, user_id: UserId, channel: DeliveryChannel) -> ConnectionId {
        let id = channel.id();
        match self.connections.insert(user_id.clone(), channel) {
            Some(old) => info!("🔌️ {user_id} connected on {id}. {} is no longer reachable", old.id()),
            None => info!("🔌️ {user_id} connected on {id}"),
        }
        id
    }

    /// Removes the user's registration, but only if it is still `connection_id`. Returns true if an entry was removed.
    pub fn unregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let removed = self.connections.remove_if(user_id, |_, channel| channel.id() == connection_id).is_some();
        if removed {
            info!("🔌️ {user_id} disconnected from {connection_id}");
        } else {
            debug!("🔌️ Ignoring unregister of {connection_id} for {user_id}. It is not the current connection");
        }
        removed
    }

    pub fn lookup(&self, user_id: &UserId) -> Presence {
        match self.connections.get(user_id) {
            Some(channel) => Presence::Online(channel.id()),
            None => Presence::Offline,
        }
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        matches!(self.lookup(user_id), Presence::Online(_))
    }

    /// Number of users with a live connection.
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }

    /// Hands `frame` to the user's live connection. Never blocks on the transport.
    pub fn deliver(&self, user_id: &UserId, frame: String) -> DeliveryOutcome {
        // Clone the handle so that no map shard stays locked while sending.
        let channel = match self.connections.get(user_id) {
            Some(channel) => channel.value().clone(),
            None => {
                trace!("🔌️ {user_id} is offline. Nothing delivered");
                return DeliveryOutcome::Offline;
            },
        };
        if channel.send(frame) {
            trace!("🔌️ Frame handed to {} for {user_id}", channel.id());
            DeliveryOutcome::Delivered(channel.id())
        } else {
            warn!("🔌️ Connection {} for {user_id} has gone away. Removing it", channel.id());
            self.unregister(user_id, channel.id());
            DeliveryOutcome::Failed(channel.id())
        }
    }
}
