use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Message, MessageId, NewMessage, UserId},
    objects::Pagination,
};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<Message, sqlx::Error> {
    let message: Message = sqlx::query_as(
        r#"
            INSERT INTO messages (id, sender_id, receiver_id, order_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(MessageId::random())
    .bind(message.sender_id)
    .bind(message.receiver_id)
    .bind(message.order_id)
    .bind(message.content)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Message {} stored", message.id);
    Ok(message)
}

/// Fetches a page of the conversation between `user` and `other`.
///
/// The page is selected newest first (so `skip = 0` always contains the latest messages) and returned oldest first.
/// Messages with identical timestamps keep their insertion order.
pub async fn fetch_conversation(
    user: &UserId,
    other: &UserId,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Message>, sqlx::Error> {
    let mut messages: Vec<Message> = sqlx::query_as(
        r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user.as_str())
    .bind(other.as_str())
    .bind(page.limit())
    .bind(page.skip())
    .fetch_all(conn)
    .await?;
    messages.reverse();
    Ok(messages)
}
