//! # Invoice bot server
//!
//! Runs the two front ends of the invoice bot in one process:
//! * The Telegram command loop ([`mod@bot`]). The administrator creates payment links with `/pay` and inspects orders
//!   with `/order` and `/stats`.
//! * The IPN listener ([`mod@routes`]). The payment gateway posts payment status updates here. Each update is
//!   authenticated ([`mod@middleware`]) and then reconciled against the order store by the invoice engine.
//!
//! When an order becomes paid, the administrator is alerted through the bot ([`mod@notifier`]).
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health` and `/`: Health checks that return `{"status":"ok",...}`.
//! * `/ipn`: The gateway's payment notification webhook.

pub mod bot;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod invoices;
pub mod middleware;
pub mod notifier;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
