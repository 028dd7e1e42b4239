use std::sync::Arc;

use ipn_common::UsdAmount;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::Serialize;
use serde_json::Value;

use crate::{config::NowPaymentsConfig, Invoice, NewInvoice, NowPaymentsApiError};

#[derive(Clone)]
pub struct NowPaymentsApi {
    config: NowPaymentsConfig,
    client: Arc<Client>,
}

impl NowPaymentsApi {
    pub fn new(config: NowPaymentsConfig) -> Result<Self, NowPaymentsApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| NowPaymentsApiError::Initialization(e.to_string()))?;
        headers.insert("x-api-key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| NowPaymentsApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a request to the gateway and returns the JSON body of a successful response.
    ///
    /// A non-2xx status is returned as [`NowPaymentsApiError::QueryError`], carrying the response body verbatim.
    pub async fn rest_query<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<Value, NowPaymentsApiError> {
        let url = self.url(path);
        trace!("🧾️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| NowPaymentsApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| NowPaymentsApiError::RestResponseError(e.to_string()))?;
        if status.is_success() {
            trace!("🧾️ REST query successful. {status}");
            serde_json::from_str(&text).map_err(|e| NowPaymentsApiError::JsonError(e.to_string()))
        } else {
            Err(NowPaymentsApiError::QueryError { status: status.as_u16(), message: text })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates an invoice for `amount`, using the local `order_id` as the correlation token.
    pub async fn create_invoice(&self, amount: UsdAmount, order_id: i64) -> Result<Invoice, NowPaymentsApiError> {
        let body = NewInvoice::new(amount, order_id, &self.config.price_currency, &self.config.pay_currency)
            .with_ipn_callback_url(self.config.ipn_callback_url.clone());
        debug!("🧾️ Creating invoice for order #{order_id} ({amount})");
        let response = self.rest_query(Method::POST, "/invoice", Some(body)).await?;
        let invoice = Invoice::from_response(&response).map_err(|e| {
            warn!("🧾️ Invoice response for order #{order_id} was incomplete. {e}. Response: {response}");
            e
        })?;
        info!("🧾️ Created invoice {} for order #{order_id}", invoice.invoice_id);
        Ok(invoice)
    }
}
