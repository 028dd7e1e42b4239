use invoice_engine::{InvoiceFlowApi, InvoiceFlowError, InvoiceGatewayDatabase};
use ipn_common::UsdAmount;
use log::*;

use crate::{
    bot::commands::{help_text, Command},
    invoices::{issue_payment_link, InvoiceIssuer, PaymentLink},
};

pub const NOT_AUTHORIZED: &str = "⛔️ This bot is for the administrator only.";

/// Everything a command needs. One instance is shared by all updates.
pub struct CommandContext<B, I> {
    flow: InvoiceFlowApi<B>,
    issuer: I,
    admin_id: i64,
}

impl<B, I> CommandContext<B, I> {
    pub fn new(flow: InvoiceFlowApi<B>, issuer: I, admin_id: i64) -> Self {
        Self { flow, issuer, admin_id }
    }

    pub fn is_admin(&self, user_id: Option<i64>) -> bool {
        user_id == Some(self.admin_id)
    }
}

impl<B, I> CommandContext<B, I>
where
    B: InvoiceGatewayDatabase,
    I: InvoiceIssuer,
{
    /// Runs `command` on behalf of `user_id` in `chat_id`, and returns the text to reply with.
    ///
    /// Anyone other than the administrator gets [`NOT_AUTHORIZED`] and nothing else happens.
    pub async fn reply(&self, user_id: Option<i64>, chat_id: i64, command: Command) -> String {
        if !self.is_admin(user_id) {
            info!("🤖️ Refusing {command:?} from user {user_id:?}");
            return NOT_AUTHORIZED.to_string();
        }
        debug!("🤖️ {command:?} in chat {chat_id}");
        let result = match command {
            Command::Start => Ok(format!("✅ The bot is up and running.\n\n{}", help_text())),
            Command::Help => Ok(help_text()),
            Command::Pay(amount) => self.pay(chat_id, &amount).await,
            Command::Order(id) => self.order(&id).await,
            Command::Stats => self.stats().await,
        };
        result.unwrap_or_else(|e| {
            error!("🤖️ Command failed. {e}");
            format!("❌ Something went wrong. {e}")
        })
    }

    async fn pay(&self, chat_id: i64, amount: &str) -> Result<String, InvoiceFlowError> {
        let amount = match amount.parse::<UsdAmount>() {
            Ok(a) if a.is_positive() => a,
            _ => {
                return Ok(format!(
                    "❌ '{}' is not a valid amount. Use a positive USD amount with at most two decimals, e.g. /pay 5.50",
                    amount.trim()
                ))
            },
        };
        let reply = match issue_payment_link(&self.flow, &self.issuer, chat_id, amount).await? {
            PaymentLink::Issued(order) => format!(
                "🧾 Order #{} for {}\nPay here: {}",
                order.id,
                order.amount_usd,
                order.invoice_url.unwrap_or_default()
            ),
            PaymentLink::Failed { order, error } => {
                format!("❌ Could not create an invoice for order #{} ({}).\n{error}", order.id, order.status)
            },
        };
        Ok(reply)
    }

    async fn order(&self, id: &str) -> Result<String, InvoiceFlowError> {
        let id = id.trim().trim_start_matches('#');
        let Ok(order_id) = id.parse::<i64>() else {
            return Ok(format!("❌ '{id}' is not an order number. Usage: /order 12"));
        };
        let reply = match self.flow.order_detail(order_id).await? {
            Some(detail) => detail.to_string(),
            None => format!("❌ Order #{order_id} does not exist."),
        };
        Ok(reply)
    }

    async fn stats(&self) -> Result<String, InvoiceFlowError> {
        let stats = self.flow.stats().await?;
        Ok(format!(
            "📊 Orders: {} total, {} paid, {} pending\nTotal value: {}\nPaid value: {}",
            stats.total, stats.paid, stats.pending, stats.sum_all, stats.sum_paid
        ))
    }
}
