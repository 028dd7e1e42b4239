use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPaymentEvent, Order, OrderStatusType},
    traits::{OrderManagement, PaymentRecorded, UpsertResult},
};

/// This trait defines the state-changing behaviour for backends supporting the invoice engine.
///
/// This behaviour includes:
/// * Creating orders when the operator asks for a payment link
/// * Recording the outcome of the invoice request against the order
/// * Recording payment notifications from the gateway and reflecting them on the order
#[allow(async_fn_in_trait)]
pub trait InvoiceGatewayDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order with status `created`, and returns it with its newly assigned id.
    async fn create_order(&self, order: NewOrder) -> Result<Order, InvoiceGatewayError>;

    /// Sets the invoice id and url on the order and moves it to `invoice_created`.
    ///
    /// An order receives at most one invoice. If the order already has an invoice,
    /// [`InvoiceGatewayError::InvoiceAlreadyAttached`] is returned and nothing is changed.
    async fn attach_invoice(
        &self,
        order_id: i64,
        invoice_id: &str,
        invoice_url: &str,
    ) -> Result<Order, InvoiceGatewayError>;

    /// Overwrites the order status unconditionally.
    async fn set_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, InvoiceGatewayError>;

    /// Inserts the payment event, or overwrites the status, payload and timestamp of the event with the same payment id.
    ///
    /// The referenced order must exist.
    async fn upsert_payment_event(&self, event: NewPaymentEvent) -> Result<UpsertResult, InvoiceGatewayError>;

    /// In a single atomic transaction,
    /// * upserts the payment event (see [`Self::upsert_payment_event`])
    /// * overwrites the status of the referenced order with the event status.
    ///
    /// Returns the order status before the change, and the updated order and event records.
    async fn record_payment_event(&self, event: NewPaymentEvent) -> Result<PaymentRecorded, InvoiceGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), InvoiceGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum InvoiceGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{0} already has an invoice. Invoices are never re-issued.")]
    InvoiceAlreadyAttached(i64),
    #[error("Invoice {0} is already attached to another order")]
    DuplicateInvoice(String),
}

impl From<sqlx::Error> for InvoiceGatewayError {
    fn from(e: sqlx::Error) -> Self {
        InvoiceGatewayError::DatabaseError(e.to_string())
    }
}
