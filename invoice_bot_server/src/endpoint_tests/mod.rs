mod bot_commands;
mod helpers;
mod ipn;
mod mocks;
