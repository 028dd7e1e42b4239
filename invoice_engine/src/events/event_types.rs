use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Emitted when a payment notification moves an order into a paid status (`confirmed` or `finished`).
///
/// Replays of a notification that leave the status unchanged do not emit this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    /// The order, as it was stored after the update
    pub order: Order,
    /// The gateway payment that settled the order
    pub payment_id: String,
    pub previous_status: OrderStatusType,
}

impl OrderPaidEvent {
    pub fn new(order: Order, payment_id: &str, previous_status: OrderStatusType) -> Self {
        Self { order, payment_id: payment_id.to_string(), previous_status }
    }
}
