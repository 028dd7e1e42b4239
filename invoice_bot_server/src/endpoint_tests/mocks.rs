use ipn_common::UsdAmount;
use mockall::mock;
use nowpayments_tools::{Invoice, NowPaymentsApiError};

use crate::invoices::InvoiceIssuer;

mock! {
    pub InvoiceIssuer {}
    impl InvoiceIssuer for InvoiceIssuer {
        async fn create_invoice(&self, amount: UsdAmount, order_id: i64) -> Result<Invoice, NowPaymentsApiError>;
    }
}
