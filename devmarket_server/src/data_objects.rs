use devmarket_engine::db_types::{GigId, Message, NewMessage, NewUser, OrderId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub gig_id: GigId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageParams {
    pub receiver_id: UserId,
    pub content: String,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

impl SendMessageParams {
    /// The message as sent by `sender_id`. The sender always comes from the access token, never from the body.
    pub fn into_message(self, sender_id: UserId) -> NewMessage {
        NewMessage { sender_id, receiver_id: self.receiver_id, order_id: self.order_id, content: self.content }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReviewParams {
    pub order_id: OrderId,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileParams {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfileParams {
    pub fn into_profile(self, id: UserId) -> NewUser {
        NewUser { id, email: self.email, full_name: self.full_name, bio: self.bio, avatar_url: self.avatar_url }
    }
}

/// Frames a client may send over its live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Send(SendMessageParams),
}

/// Replies to [`ClientFrame`]s. Push notifications use their own frame types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AckFrame {
    Sent { message: Message },
    Error { message: String },
}
