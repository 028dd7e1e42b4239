use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use invoice_engine::{InvoiceFlowError, InvoiceGatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] SignatureError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Reasons a gateway notification fails authentication. All of them are answered with 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No signature header was provided.")]
    MissingSignature,
    #[error("The request body is not valid JSON.")]
    InvalidJson,
    #[error("The signature does not match the request body.")]
    InvalidSignature,
}

impl From<InvoiceGatewayError> for ServerError {
    fn from(e: InvoiceGatewayError) -> Self {
        Self::BackendError(format!("Database error: {e}"))
    }
}

impl From<InvoiceFlowError> for ServerError {
    fn from(e: InvoiceFlowError) -> Self {
        Self::BackendError(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use actix_web::body::MessageBody;

    use super::*;

    #[test]
    fn signature_failures_are_unauthorized() {
        let err = ServerError::from(SignatureError::InvalidSignature);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = res.into_body().try_into_bytes().unwrap();
        assert_eq!(body, r#"{"error":"Authentication Error. The signature does not match the request body."}"#);
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let err = ServerError::from(InvoiceGatewayError::DatabaseError("disk full".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
