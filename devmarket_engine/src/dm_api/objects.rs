use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Cents, Message, OrderId, OrderStatusType},
    events::OrderStatusChangedEvent,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Offset pagination, as accepted in query strings (`?skip=0&limit=50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_page_size")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// The offset, never negative.
    pub fn skip(&self) -> i64 {
        self.skip.max(0)
    }

    /// The page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

/// What a client submits as evidence of an out-of-band payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub proof_reference: String,
    pub payer_name: String,
    pub amount: Cents,
}

/// A frame pushed to a user over their live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushNotification {
    /// Someone sent the user a message.
    Message { message: Message },
    /// An order the user takes part in changed status.
    OrderUpdated {
        order_id: OrderId,
        previous_status: OrderStatusType,
        status: OrderStatusType,
        updated_at: DateTime<Utc>,
    },
}

impl PushNotification {
    pub fn new_message(message: Message) -> Self {
        Self::Message { message }
    }

    pub fn order_updated(ev: &OrderStatusChangedEvent) -> Self {
        Self::OrderUpdated {
            order_id: ev.order.id.clone(),
            previous_status: ev.previous_status,
            status: ev.order.status,
            updated_at: ev.order.updated_at,
        }
    }

    /// Serializes the notification into the text frame that goes over the wire.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
