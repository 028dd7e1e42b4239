use std::time::Duration;

use ipn_common::{Secret, USD_CURRENCY_CODE};

pub const DEFAULT_API_URL: &str = "https://api.nowpayments.io/v1";
pub const DEFAULT_PRICE_CURRENCY: &str = USD_CURRENCY_CODE;
pub const DEFAULT_PAY_CURRENCY: &str = "usdttrc20";
pub const DEFAULT_INVOICE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NowPaymentsConfig {
    /// Base url of the REST API, without a trailing slash.
    pub api_url: String,
    pub api_key: Secret<String>,
    /// The shared secret the gateway uses to sign IPN callbacks.
    pub ipn_secret: Secret<String>,
    pub price_currency: String,
    pub pay_currency: String,
    /// Public url of this service's IPN endpoint. When omitted, the gateway uses the url set in its dashboard.
    pub ipn_callback_url: Option<String>,
    /// Upper bound for a single invoice request.
    pub timeout: Duration,
}

impl Default for NowPaymentsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: Secret::default(),
            ipn_secret: Secret::default(),
            price_currency: DEFAULT_PRICE_CURRENCY.to_string(),
            pay_currency: DEFAULT_PAY_CURRENCY.to_string(),
            ipn_callback_url: None,
            timeout: DEFAULT_INVOICE_TIMEOUT,
        }
    }
}
