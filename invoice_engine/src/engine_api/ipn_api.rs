use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, PaymentUpdate},
    events::{EventProducers, OrderPaidEvent},
    traits::{InvoiceGatewayDatabase, InvoiceGatewayError, UpsertResult},
};

/// What happened to a verified payment notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpnOutcome {
    /// No order carries the invoice id. Nothing was stored.
    UnknownInvoice(String),
    /// The payment event was stored and the order status overwritten.
    Recorded {
        order: Order,
        upsert: UpsertResult,
        /// True if the order just became paid and the order-paid hook was fired
        paid_event_published: bool,
    },
}

/// `IpnApi` holds the reconciliation logic for payment notifications.
///
/// It assumes the notification has already been authenticated and parsed. Each update is applied with last-write-wins
/// semantics: the order takes whatever status the gateway reported most recently.
pub struct IpnApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for IpnApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IpnApi")
    }
}

impl<B> IpnApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> IpnApi<B>
where B: InvoiceGatewayDatabase
{
    /// Applies a payment update to the order that owns its invoice.
    ///
    /// * An unknown invoice is ignored and reported as [`IpnOutcome::UnknownInvoice`].
    /// * Otherwise the payment event is upserted and the order status overwritten in one transaction.
    /// * If the order moved into `confirmed` or `finished` from any other status, an [`OrderPaidEvent`] is published.
    ///   A replay that leaves the status unchanged publishes nothing.
    pub async fn process_payment_update(&self, update: PaymentUpdate) -> Result<IpnOutcome, InvoiceGatewayError> {
        let Some(order) = self.db.fetch_order_by_invoice(&update.invoice_id).await? else {
            info!("💸️ Payment {} refers to unknown invoice {}. Ignoring it.", update.payment_id, update.invoice_id);
            return Ok(IpnOutcome::UnknownInvoice(update.invoice_id));
        };
        let recorded = self.db.record_payment_event(update.for_order(order.id)).await?;
        debug!(
            "💸️ Payment {} ({:?}) applied to order #{}. {} -> {}",
            update.payment_id, recorded.upsert, order.id, recorded.previous_status, recorded.order.status
        );
        if recorded.left_paid() {
            warn!(
                "💸️ Order #{} was {} but payment {} has moved it back to {}",
                order.id, recorded.previous_status, update.payment_id, recorded.order.status
            );
        }
        let paid_event_published = recorded.became_paid();
        if paid_event_published {
            info!("💸️ Order #{} is paid ({})", order.id, recorded.order.status);
            let event = OrderPaidEvent::new(recorded.order.clone(), &update.payment_id, recorded.previous_status);
            self.producers.publish_order_paid(event).await;
        }
        Ok(IpnOutcome::Recorded { order: recorded.order, upsert: recorded.upsert, paid_event_published })
    }
}
