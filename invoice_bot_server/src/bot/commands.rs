use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "check that the bot is running.")]
    Start,
    #[command(description = "create a payment link for an amount in USD, e.g. /pay 5.50")]
    Pay(String),
    #[command(description = "show an order and its payments, e.g. /order 12")]
    Order(String),
    #[command(description = "show order totals.")]
    Stats,
    #[command(description = "show this message.")]
    Help,
}

pub fn help_text() -> String {
    Command::descriptions().to_string()
}
