use ipn_common::UsdAmount;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NowPaymentsApiError;

/// Returns the first of `names` that is present in `object` as a non-empty string or a number, rendered as a string.
///
/// The gateway is not consistent about field names or types (`"id": 5077125051` in one place, `"invoice_id":
/// "5077125051"` in another), so lookups go through this function.
pub fn first_string_field(object: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match object.get(*name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//--------------------------------------     NewInvoice      ---------------------------------------------------------
/// Request body for `POST /invoice`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewInvoice {
    pub price_amount: f64,
    pub price_currency: String,
    pub pay_currency: String,
    /// Correlation token. This is the local order id.
    pub order_id: String,
    pub order_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<String>,
}

impl NewInvoice {
    pub fn new(amount: UsdAmount, order_id: i64, price_currency: &str, pay_currency: &str) -> Self {
        Self {
            price_amount: amount.as_dollars_f64(),
            price_currency: price_currency.to_string(),
            pay_currency: pay_currency.to_string(),
            order_id: order_id.to_string(),
            order_description: format!("Order #{order_id}"),
            ipn_callback_url: None,
        }
    }

    pub fn with_ipn_callback_url(mut self, url: Option<String>) -> Self {
        self.ipn_callback_url = url;
        self
    }
}

//--------------------------------------       Invoice       ---------------------------------------------------------
/// The parts of the gateway's invoice response that this service uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub invoice_url: String,
}

impl Invoice {
    /// Extracts the invoice id (`id` or `invoice_id`) and payer-facing url (`invoice_url` or `url`).
    pub fn from_response(value: &Value) -> Result<Self, NowPaymentsApiError> {
        let invoice_id =
            first_string_field(value, &["id", "invoice_id"]).ok_or(NowPaymentsApiError::IncompleteResponse("id"))?;
        let invoice_url = first_string_field(value, &["invoice_url", "url"])
            .ok_or(NowPaymentsApiError::IncompleteResponse("invoice_url"))?;
        Ok(Self { invoice_id, invoice_url })
    }
}

//--------------------------------------   IpnNotification   ---------------------------------------------------------
/// A normalised instant payment notification.
///
/// Missing values are represented by empty strings. `status` is lower case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpnNotification {
    pub payment_id: String,
    pub invoice_id: String,
    pub status: String,
}

impl IpnNotification {
    pub fn from_value(value: &Value) -> Self {
        let status = first_string_field(value, &["payment_status", "status"]).unwrap_or_default().to_lowercase();
        let payment_id = first_string_field(value, &["payment_id", "id"]).unwrap_or_default();
        let invoice_id = first_string_field(value, &["invoice_id", "invoice"]).unwrap_or_default();
        Self { payment_id, invoice_id, status }
    }

    /// A notification can only be matched to an order if it carries both a payment id and an invoice id.
    pub fn is_actionable(&self) -> bool {
        !self.payment_id.is_empty() && !self.invoice_id.is_empty()
    }
}
