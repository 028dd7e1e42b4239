use std::{env, time::Duration};

use ipn_common::{parse_boolean_flag, Secret};
use log::*;
use nowpayments_tools::NowPaymentsConfig;

use crate::errors::ServerError;

const DEFAULT_IB_HOST: &str = "0.0.0.0";
const DEFAULT_IB_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/orders.db";
const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Header the gateway puts the notification signature in.
pub const IPN_SIGNATURE_HEADER: &str = "x-nowpayments-sig";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub bot: BotConfig,
    pub nowpayments: NowPaymentsConfig,
    /// If false, IPN signatures are not checked and every notification is accepted. **DANGER**
    pub ipn_checks: bool,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: Secret<String>,
    /// The Telegram user id of the only person allowed to use the bot. Paid-order alerts go to this user too.
    pub admin_id: i64,
    /// Upper bound for delivering a single paid-order alert.
    pub notify_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self { token: Secret::default(), admin_id: 0, notify_timeout: DEFAULT_NOTIFY_TIMEOUT }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_IB_HOST.to_string(),
            port: DEFAULT_IB_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bot: BotConfig::default(),
            nowpayments: NowPaymentsConfig::default(),
            ipn_checks: true,
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from the environment. Fails if any of the required variables is missing or invalid.
    pub fn try_from_env() -> Result<Self, ServerError> {
        Self::try_from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Self::try_from_env`], but reads variables through `lookup`.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where F: Fn(&str) -> Option<String> {
        let token = required(&lookup, "IB_BOT_TOKEN")?;
        let admin_id = required(&lookup, "IB_ADMIN_ID")?
            .trim()
            .parse::<i64>()
            .map_err(|e| ServerError::ConfigurationError(format!("IB_ADMIN_ID must be an integer user id. {e}")))?;
        let api_key = required(&lookup, "IB_NOWPAYMENTS_API_KEY")?;
        let ipn_secret = required(&lookup, "IB_NOWPAYMENTS_IPN_SECRET")?;

        let host = lookup("IB_HOST").unwrap_or_else(|| DEFAULT_IB_HOST.into());
        let port = lookup("IB_PORT")
            .or_else(|| lookup("PORT"))
            .map(|s| {
                s.trim().parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port. {e} Using the default, {DEFAULT_IB_PORT}, instead.");
                    DEFAULT_IB_PORT
                })
            })
            .unwrap_or(DEFAULT_IB_PORT);
        let database_url = lookup("IB_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ IB_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let notify_timeout = seconds(&lookup, "IB_NOTIFY_TIMEOUT").unwrap_or(DEFAULT_NOTIFY_TIMEOUT);
        let ipn_checks = parse_boolean_flag(lookup("IB_IPN_CHECKS"), true);
        if !ipn_checks {
            warn!(
                "🚨️🚨️🚨️ IPN signature checks are DISABLED. Anyone can mark orders as paid. Never run like this in \
                 production. 🚨️🚨️🚨️"
            );
        }

        let defaults = NowPaymentsConfig::default();
        let nowpayments = NowPaymentsConfig {
            api_url: lookup("IB_NOWPAYMENTS_API_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_key: Secret::new(api_key),
            ipn_secret: Secret::new(ipn_secret),
            price_currency: lookup("IB_PRICE_CURRENCY").map(|s| s.to_lowercase()).unwrap_or(defaults.price_currency),
            pay_currency: lookup("IB_PAY_CURRENCY").map(|s| s.to_lowercase()).unwrap_or(defaults.pay_currency),
            ipn_callback_url: lookup("IB_IPN_CALLBACK_URL").filter(|s| !s.trim().is_empty()),
            timeout: seconds(&lookup, "IB_INVOICE_TIMEOUT").unwrap_or(defaults.timeout),
        };
        if nowpayments.ipn_callback_url.is_none() {
            info!("🪛️ IB_IPN_CALLBACK_URL is not set. The gateway will use the IPN url from its dashboard.");
        }
        let bot = BotConfig { token: Secret::new(token), admin_id, notify_timeout };
        Ok(Self { host, port, database_url, bot, nowpayments, ipn_checks })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ServerError>
where F: Fn(&str) -> Option<String> {
    match lookup(name) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ServerError::ConfigurationError(format!("{name} is not set"))),
    }
}

fn seconds<F>(lookup: &F, name: &str) -> Option<Duration>
where F: Fn(&str) -> Option<String> {
    lookup(name)
        .and_then(|s| s.trim().parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for {name}. {e}")).ok())
        .map(Duration::from_secs)
}
