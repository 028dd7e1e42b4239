use crate::db_types::{Order, OrderStatusType, PaymentEvent};

/// Whether an upsert created a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    Inserted,
    Updated,
}

/// The result of applying a payment update to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecorded {
    /// The order status before the update was applied
    pub previous_status: OrderStatusType,
    /// The order after the update
    pub order: Order,
    pub event: PaymentEvent,
    pub upsert: UpsertResult,
}

impl PaymentRecorded {
    /// True if this update moved the order into a paid status from some other status.
    pub fn became_paid(&self) -> bool {
        self.order.status.is_paid() && self.previous_status != self.order.status
    }

    /// True if a paid order was moved back to an unpaid status.
    pub fn left_paid(&self) -> bool {
        self.previous_status.is_paid() && !self.order.status.is_paid()
    }
}
