use thiserror::Error;

#[derive(Debug, Error)]
pub enum NowPaymentsApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway accepted the request but the response is missing '{0}'")]
    IncompleteResponse(&'static str),
}

impl NowPaymentsApiError {
    /// True if the gateway answered with a success status, but left out the invoice id or url.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::IncompleteResponse(_))
    }

    /// True if the gateway answered with a non-2xx status.
    pub fn is_http_status_error(&self) -> bool {
        matches!(self, Self::QueryError { .. })
    }
}
