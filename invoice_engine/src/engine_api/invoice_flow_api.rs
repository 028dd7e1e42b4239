use std::fmt::Debug;

use ipn_common::UsdAmount;
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderStats},
    engine_api::{
        errors::InvoiceFlowError,
        order_objects::{InvoiceFailure, OrderDetail},
    },
    traits::InvoiceGatewayDatabase,
};

/// `InvoiceFlowApi` handles the operator side of the order lifecycle: an order is created first, and then exactly one
/// invoice outcome is recorded against it.
///
/// The API never talks to the payment gateway itself. Callers request the invoice in between [`Self::create_order`]
/// and [`Self::invoice_issued`] / [`Self::invoice_failed`], so no store resources are held while the request is in
/// flight.
pub struct InvoiceFlowApi<B> {
    db: B,
}

impl<B> Debug for InvoiceFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvoiceFlowApi")
    }
}

impl<B: Clone> Clone for InvoiceFlowApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> InvoiceFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> InvoiceFlowApi<B>
where B: InvoiceGatewayDatabase
{
    /// Stores a new order for `amount` with status `created`. Zero and negative amounts are rejected before anything
    /// is written.
    pub async fn create_order(&self, chat_id: i64, amount: UsdAmount) -> Result<Order, InvoiceFlowError> {
        if !amount.is_positive() {
            return Err(InvoiceFlowError::InvalidAmount(format!("{amount} is not a positive amount")));
        }
        let order = self.db.create_order(NewOrder::new(chat_id, amount)).await?;
        info!("📦️ Order #{} created for {} (chat {chat_id})", order.id, order.amount_usd);
        Ok(order)
    }

    /// Records the invoice the gateway issued for the order, moving it to `invoice_created`.
    pub async fn invoice_issued(
        &self,
        order_id: i64,
        invoice_id: &str,
        invoice_url: &str,
    ) -> Result<Order, InvoiceFlowError> {
        let order = self.db.attach_invoice(order_id, invoice_id, invoice_url).await?;
        debug!("📦️ Order #{order_id} is now waiting on invoice {invoice_id}");
        Ok(order)
    }

    /// Records that the invoice request for the order failed. The failure status is terminal for this order; the
    /// invoice is never retried.
    pub async fn invoice_failed(&self, order_id: i64, failure: InvoiceFailure) -> Result<Order, InvoiceFlowError> {
        let status = failure.order_status();
        warn!("📦️ Invoice request for order #{order_id} failed. Marking the order as {status}");
        let order = self.db.set_order_status(order_id, status).await?;
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, InvoiceFlowError> {
        let order = self.db.fetch_order(order_id).await?;
        Ok(order)
    }

    /// Fetches the order along with its payment history. Returns `None` if the order does not exist.
    pub async fn order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>, InvoiceFlowError> {
        let Some(order) = self.db.fetch_order(order_id).await? else {
            return Ok(None);
        };
        let events = self.db.fetch_payment_events_for_order(order_id).await?;
        Ok(Some(OrderDetail { order, events }))
    }

    pub async fn stats(&self) -> Result<OrderStats, InvoiceFlowError> {
        let stats = self.db.stats_summary().await?;
        trace!("📦️ Order stats: {stats:?}");
        Ok(stats)
    }
}
