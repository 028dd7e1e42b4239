//! Issuing payment links: create the order, ask the gateway for an invoice, and record whichever outcome came back.
use invoice_engine::{db_types::Order, InvoiceFailure, InvoiceFlowApi, InvoiceFlowError, InvoiceGatewayDatabase};
use ipn_common::UsdAmount;
use log::*;
use nowpayments_tools::{Invoice, NowPaymentsApi, NowPaymentsApiError};

/// Anything that can create a gateway invoice for a local order.
#[allow(async_fn_in_trait)]
pub trait InvoiceIssuer {
    async fn create_invoice(&self, amount: UsdAmount, order_id: i64) -> Result<Invoice, NowPaymentsApiError>;
}

impl InvoiceIssuer for NowPaymentsApi {
    async fn create_invoice(&self, amount: UsdAmount, order_id: i64) -> Result<Invoice, NowPaymentsApiError> {
        NowPaymentsApi::create_invoice(self, amount, order_id).await
    }
}

#[derive(Debug)]
pub enum PaymentLink {
    /// The order now carries an invoice, and `order.invoice_url` is the link to hand to the payer.
    Issued(Order),
    /// The gateway did not issue an invoice. The failure has been recorded on the order.
    Failed { order: Order, error: NowPaymentsApiError },
}

/// Maps a gateway error onto the order status that records it.
pub fn classify_failure(error: &NowPaymentsApiError) -> InvoiceFailure {
    if error.is_malformed_response() {
        InvoiceFailure::MalformedResponse
    } else if error.is_http_status_error() {
        InvoiceFailure::HttpStatus
    } else {
        InvoiceFailure::Exception
    }
}

/// Creates an order for `amount` and requests its invoice.
///
/// The store is not touched while the gateway request is in flight. Gateway failures are not errors here: they are
/// recorded on the order and returned as [`PaymentLink::Failed`]. Only storage failures and invalid amounts are
/// returned as `Err`.
pub async fn issue_payment_link<B, I>(
    flow: &InvoiceFlowApi<B>,
    issuer: &I,
    chat_id: i64,
    amount: UsdAmount,
) -> Result<PaymentLink, InvoiceFlowError>
where
    B: InvoiceGatewayDatabase,
    I: InvoiceIssuer,
{
    let order = flow.create_order(chat_id, amount).await?;
    match issuer.create_invoice(order.amount_usd, order.id).await {
        Ok(invoice) => {
            let order = flow.invoice_issued(order.id, &invoice.invoice_id, &invoice.invoice_url).await?;
            Ok(PaymentLink::Issued(order))
        },
        Err(error) => {
            warn!("🧾️ Could not create an invoice for order #{}. {error}", order.id);
            let order = flow.invoice_failed(order.id, classify_failure(&error)).await?;
            Ok(PaymentLink::Failed { order, error })
        },
    }
}
