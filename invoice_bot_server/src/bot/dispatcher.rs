use std::sync::Arc;

use invoice_engine::SqliteDatabase;
use log::*;
use nowpayments_tools::NowPaymentsApi;
use teloxide::{prelude::*, RequestError};

use crate::bot::{commands::Command, replies::CommandContext};

pub type BotContext = CommandContext<SqliteDatabase, NowPaymentsApi>;

/// Long-polls Telegram for commands and answers each one in the chat it came from. Runs until the process stops.
pub async fn run_command_loop(bot: Bot, context: BotContext) {
    let context = Arc::new(context);
    let handler = Update::filter_message().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let context = Arc::clone(&context);
            async move {
                let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok());
                let reply = context.reply(user_id, msg.chat.id.0, cmd).await;
                bot.send_message(msg.chat.id, reply).await?;
                Ok::<_, RequestError>(())
            }
        },
    );
    info!("🤖️ Starting the command loop");
    Dispatcher::builder(bot, handler)
        .default_handler(|upd| async move { trace!("🤖️ Unhandled update: {:?}", upd.id) })
        .error_handler(LoggingErrorHandler::with_custom_text("🤖️ Could not send a reply"))
        .build()
        .dispatch()
        .await;
    info!("🤖️ Command loop has stopped");
}
