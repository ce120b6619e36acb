use std::fmt::Debug;

use log::*;

use crate::{
    connections::{ConnectionRegistry, DeliveryOutcome},
    db_types::{Message, NewMessage, UserId},
    objects::{Pagination, PushNotification},
    traits::{MessageManagement, MessagingError},
};

/// Stores messages and pushes them to recipients that are online.
///
/// Storage is authoritative: a message that was stored is a sent message, whether or not the live push worked.
/// Offline recipients see it the next time they read the conversation history.
pub struct MessageDispatcher<B> {
    db: B,
    registry: ConnectionRegistry,
}

impl<B> Debug for MessageDispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageDispatcher ({} online)", self.registry.online_count())
    }
}

impl<B> MessageDispatcher<B> {
    pub fn new(db: B, registry: ConnectionRegistry) -> Self {
        Self { db, registry }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}

impl<B> MessageDispatcher<B>
where B: MessageManagement
{
    /// Sends a message from `message.sender_id` to `message.receiver_id`.
    ///
    /// Fails with `RecipientNotFound` (or `OrderNotFound` for a bad order reference) before anything is stored.
    /// Once the message is stored the call succeeds; a failed live push is only logged.
    pub async fn send(&self, message: NewMessage) -> Result<Message, MessagingError> {
        if message.content.trim().is_empty() {
            return Err(MessagingError::EmptyMessage);
        }
        if !self.db.user_exists(&message.receiver_id).await? {
            debug!("💬️ {} tried to message unknown user {}", message.sender_id, message.receiver_id);
            return Err(MessagingError::RecipientNotFound(message.receiver_id));
        }
        if let Some(order_id) = &message.order_id {
            if !self.db.order_exists(order_id).await? {
                return Err(MessagingError::OrderNotFound(order_id.clone()));
            }
        }
        let message = self.db.insert_message(message).await?;
        debug!("💬️ Message {} from {} to {} stored", message.id, message.sender_id, message.receiver_id);
        self.push(&message);
        Ok(message)
    }

    /// A page of the conversation between `user` and `other`, oldest first.
    pub async fn history(
        &self,
        user: &UserId,
        other: &UserId,
        page: Pagination,
    ) -> Result<Vec<Message>, MessagingError> {
        self.db.fetch_conversation(user, other, page).await
    }

    fn push(&self, message: &Message) {
        let frame = match PushNotification::new_message(message.clone()).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("💬️ Could not serialize message {} for live delivery. {e}", message.id);
                return;
            },
        };
        match self.registry.deliver(&message.receiver_id, frame) {
            DeliveryOutcome::Delivered(conn) => {
                trace!("💬️ Message {} pushed to {} on {conn}", message.id, message.receiver_id)
            },
            DeliveryOutcome::Offline => {
                trace!("💬️ {} is offline. Message {} will be picked up from history", message.receiver_id, message.id)
            },
            DeliveryOutcome::Failed(conn) => {
                warn!("💬️ Live delivery of message {} to {} on {conn} failed", message.id, message.receiver_id)
            },
        }
    }
}
