//! Paid-order alerts for the operator.
//!
//! Alerts are delivered from the order-paid event hook, off the webhook's response path. Delivery is best effort:
//! failures and timeouts are logged and dropped, and never retried.
use std::{future::Future, sync::Arc, time::Duration};

use invoice_engine::events::{EventHooks, OrderPaidEvent};
use log::*;
use teloxide::{requests::Requester, types::ChatId, Bot};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Could not deliver the message. {0}")]
    DeliveryFailed(String),
}

/// Delivers a text message to a chat.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, chat_id: i64, message: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sends alerts as Telegram messages through the bot handle created at start-up.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, chat_id: i64, message: &str) -> impl Future<Output = Result<(), NotifyError>> + Send {
        let request = self.bot.send_message(ChatId(chat_id), message.to_string());
        async move {
            request.await.map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
            Ok(())
        }
    }
}

/// The alert text for a paid order.
pub fn paid_order_message(event: &OrderPaidEvent) -> String {
    let order = &event.order;
    format!(
        "✅ Order #{} has been paid\nAmount: {}\nStatus: {}\nPayment id: {}",
        order.id, order.amount_usd, order.status, event.payment_id
    )
}

/// Registers an order-paid hook that alerts `admin_id` through `notifier`, giving up after `timeout`.
///
/// If there is no notifier, no hook is registered and paid orders are only logged.
pub fn paid_order_alert_hooks<N: Notifier>(notifier: Option<N>, admin_id: i64, timeout: Duration) -> EventHooks {
    let mut hooks = EventHooks::default();
    let Some(notifier) = notifier else {
        warn!("📬️ No notifier is configured. Paid orders will not be announced.");
        return hooks;
    };
    let notifier = Arc::new(notifier);
    hooks.on_order_paid(move |ev| {
        let notifier = Arc::clone(&notifier);
        Box::pin(async move {
            let message = paid_order_message(&ev);
            match tokio::time::timeout(timeout, notifier.notify(admin_id, &message)).await {
                Ok(Ok(())) => info!("📬️ Operator notified that order #{} is paid", ev.order.id),
                Ok(Err(e)) => warn!("📬️ Could not notify the operator about order #{}. {e}", ev.order.id),
                Err(_) => warn!(
                    "📬️ Notifying the operator about order #{} took longer than {}s. Giving up.",
                    ev.order.id,
                    timeout.as_secs()
                ),
            }
        })
    });
    hooks
}
