use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ipn_common::UsdAmount;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle state of an order.
///
/// The first five variants are set locally while creating the invoice. Everything after that is reported by the
/// payment gateway, and the set of values the gateway may send is open-ended, hence [`OrderStatusType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OrderStatusType {
    /// The order exists locally, but no invoice has been requested yet.
    Created,
    /// The gateway issued an invoice for the order.
    InvoiceCreated,
    /// The gateway accepted the request, but its response did not contain an invoice id and url.
    InvoiceError,
    /// The gateway rejected the invoice request with a non-2xx status.
    InvoiceHttpError,
    /// The invoice request failed for any other reason (network, timeout, unreadable response).
    InvoiceException,
    Waiting,
    Confirming,
    Confirmed,
    Sending,
    PartiallyPaid,
    Finished,
    Failed,
    Refunded,
    Expired,
    Other(String),
}

impl OrderStatusType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::InvoiceCreated => "invoice_created",
            Self::InvoiceError => "invoice_error",
            Self::InvoiceHttpError => "invoice_http_error",
            Self::InvoiceException => "invoice_exception",
            Self::Waiting => "waiting",
            Self::Confirming => "confirming",
            Self::Confirmed => "confirmed",
            Self::Sending => "sending",
            Self::PartiallyPaid => "partially_paid",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Expired => "expired",
            Self::Other(s) => s.as_str(),
        }
    }

    /// `confirmed` and `finished` count as paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Finished)
    }

    /// True for the statuses recorded when an invoice could not be created.
    pub fn is_invoice_failure(&self) -> bool {
        matches!(self, Self::InvoiceError | Self::InvoiceHttpError | Self::InvoiceException)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status parsing is case-insensitive and never fails. Unknown values are kept verbatim (lower-cased) in `Other`.
impl FromStr for OrderStatusType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let status = match s.as_str() {
            "created" => Self::Created,
            "invoice_created" => Self::InvoiceCreated,
            "invoice_error" => Self::InvoiceError,
            "invoice_http_error" => Self::InvoiceHttpError,
            "invoice_exception" => Self::InvoiceException,
            "waiting" => Self::Waiting,
            "confirming" => Self::Confirming,
            "confirmed" => Self::Confirmed,
            "sending" => Self::Sending,
            "partially_paid" => Self::PartiallyPaid,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            "expired" => Self::Expired,
            _ => Self::Other(s),
        };
        Ok(status)
    }
}

impl From<&str> for OrderStatusType {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(status) => status,
            Err(e) => match e {},
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<OrderStatusType> for String {
    fn from(value: OrderStatusType) -> Self {
        value.to_string()
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub chat_id: i64,
    pub amount_usd: UsdAmount,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatusType,
}

impl Order {
    pub fn has_invoice(&self) -> bool {
        self.invoice_id.is_some()
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Order #{} ({}) status: {}", self.id, self.amount_usd, self.status)?;
        if let Some(invoice) = &self.invoice_id {
            write!(f, " invoice: {invoice}")?;
        }
        Ok(())
    }
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// The conversation the payment link was requested from.
    pub chat_id: i64,
    pub amount_usd: UsdAmount,
}

impl NewOrder {
    pub fn new(chat_id: i64, amount_usd: UsdAmount) -> Self {
        Self { chat_id, amount_usd }
    }
}

//--------------------------------------     PaymentEvent    ---------------------------------------------------------
/// The last known state of one gateway payment, including the verbatim notification body that reported it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub payment_id: String,
    pub order_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatusType,
    pub raw_payload: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentEvent {
    pub payment_id: String,
    pub order_id: i64,
    pub status: OrderStatusType,
    pub raw_payload: String,
}

impl NewPaymentEvent {
    pub fn new<S: Into<OrderStatusType>>(payment_id: &str, order_id: i64, status: S, raw_payload: &str) -> Self {
        Self {
            payment_id: payment_id.to_string(),
            order_id,
            status: status.into(),
            raw_payload: raw_payload.to_string(),
        }
    }
}

//--------------------------------------     PaymentUpdate   ---------------------------------------------------------
/// A verified payment status update from the gateway, addressed by invoice rather than by local order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub payment_id: String,
    pub invoice_id: String,
    pub status: OrderStatusType,
    /// The notification body exactly as it was received.
    pub raw_payload: String,
}

impl PaymentUpdate {
    pub fn new<S: Into<OrderStatusType>>(payment_id: &str, invoice_id: &str, status: S, raw_payload: &str) -> Self {
        Self {
            payment_id: payment_id.to_string(),
            invoice_id: invoice_id.to_string(),
            status: status.into(),
            raw_payload: raw_payload.to_string(),
        }
    }

    pub fn for_order(&self, order_id: i64) -> NewPaymentEvent {
        NewPaymentEvent {
            payment_id: self.payment_id.clone(),
            order_id,
            status: self.status.clone(),
            raw_payload: self.raw_payload.clone(),
        }
    }
}

//--------------------------------------      OrderStats     ---------------------------------------------------------
/// Aggregate order counts and totals, split by whether the order has been paid (`confirmed` or `finished`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: i64,
    pub paid: i64,
    pub pending: i64,
    pub sum_all: UsdAmount,
    pub sum_paid: UsdAmount,
}

impl OrderStats {
    pub fn new(total: i64, paid: i64, sum_all: UsdAmount, sum_paid: UsdAmount) -> Self {
        Self { total, paid, pending: total - paid, sum_all, sum_paid }
    }
}
