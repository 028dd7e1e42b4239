use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, PaymentEvent};

/// Why the gateway did not hand back an invoice. Each kind is recorded on the order as its own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceFailure {
    /// The gateway answered with a 2xx status, but the response had no invoice id or url
    MalformedResponse,
    /// The gateway answered with a non-2xx status
    HttpStatus,
    /// Transport errors, timeouts and unreadable responses
    Exception,
}

impl InvoiceFailure {
    pub fn order_status(&self) -> OrderStatusType {
        match self {
            Self::MalformedResponse => OrderStatusType::InvoiceError,
            Self::HttpStatus => OrderStatusType::InvoiceHttpError,
            Self::Exception => OrderStatusType::InvoiceException,
        }
    }
}

/// An order together with every payment event recorded against it, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub events: Vec<PaymentEvent>,
}

impl Display for OrderDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Order #{}", self.order.id)?;
        writeln!(f, "Amount: {}", self.order.amount_usd)?;
        writeln!(f, "Status: {}", self.order.status)?;
        writeln!(f, "Created: {}", self.order.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        if let Some(url) = &self.order.invoice_url {
            writeln!(f, "Invoice: {url}")?;
        }
        for event in &self.events {
            writeln!(f, "Payment {}: {} ({})", event.payment_id, event.status, event.updated_at.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}
