//! The operator's Telegram command surface.
//!
//! * [`commands`] defines the commands the bot understands.
//! * [`replies`] turns a command into the reply text. It holds all the behaviour and knows nothing about Telegram.
//! * [`dispatcher`] runs the long-polling loop and sends the replies.
pub mod commands;
pub mod dispatcher;
pub mod replies;

pub use commands::Command;
pub use dispatcher::run_command_loop;
pub use replies::CommandContext;
