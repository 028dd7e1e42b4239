use thiserror::Error;

use crate::traits::InvoiceGatewayError;

#[derive(Debug, Clone, Error)]
pub enum InvoiceFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{0} already has an invoice")]
    InvoiceAlreadyIssued(i64),
}

impl From<InvoiceGatewayError> for InvoiceFlowError {
    fn from(e: InvoiceGatewayError) -> Self {
        match e {
            InvoiceGatewayError::OrderNotFound(id) => Self::OrderNotFound(id),
            InvoiceGatewayError::InvoiceAlreadyAttached(id) => Self::InvoiceAlreadyIssued(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}
