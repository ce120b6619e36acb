use thiserror::Error;

use crate::{
    db_types::{Message, NewMessage, OrderId, UserId},
    objects::Pagination,
};

#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Recipient {0} does not exist")]
    RecipientNotFound(UserId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Message content cannot be empty")]
    EmptyMessage,
}

impl From<sqlx::Error> for MessagingError {
    fn from(e: sqlx::Error) -> Self {
        MessagingError::DatabaseError(e.to_string())
    }
}

/// Storage behaviour for the message log. Messages are immutable once stored.
#[allow(async_fn_in_trait)]
pub trait MessageManagement {
    async fn user_exists(&self, user_id: &UserId) -> Result<bool, MessagingError>;

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, MessagingError>;

    async fn insert_message(&self, message: NewMessage) -> Result<Message, MessagingError>;

    /// Messages exchanged between the two users, in either direction. Returns the `page.limit` most recent messages
    /// after skipping the `page.skip` most recent ones, ordered oldest first.
    async fn fetch_conversation(
        &self,
        user: &UserId,
        other: &UserId,
        page: Pagination,
    ) -> Result<Vec<Message>, MessagingError>;
}
