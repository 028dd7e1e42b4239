use crate::{
    db_types::{Order, OrderStats, PaymentEvent},
    traits::InvoiceGatewayError,
};

/// The `OrderManagement` trait defines the behaviour for querying information about orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given local id.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, InvoiceGatewayError>;

    /// Fetches the order that the gateway invoice `invoice_id` was issued for. This is an exact match.
    async fn fetch_order_by_invoice(&self, invoice_id: &str) -> Result<Option<Order>, InvoiceGatewayError>;

    async fn fetch_payment_event(&self, payment_id: &str) -> Result<Option<PaymentEvent>, InvoiceGatewayError>;

    /// All the payment events recorded against the order, most recently updated first.
    async fn fetch_payment_events_for_order(&self, order_id: i64) -> Result<Vec<PaymentEvent>, InvoiceGatewayError>;

    /// Order counts and totals, partitioned by whether the order status is `confirmed` or `finished`.
    async fn stats_summary(&self) -> Result<OrderStats, InvoiceGatewayError>;
}
