use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Emitted after an order's status has been written. Never emitted for no-op requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    /// The order as stored after the change.
    pub order: Order,
    pub previous_status: OrderStatusType,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, previous_status: OrderStatusType) -> Self {
        Self { order, previous_status }
    }
}
