//! Client-side plumbing for the NOWPayments invoice API.
//!
//! * [`NowPaymentsApi`] issues invoices on behalf of local orders.
//! * [`IpnNotification`] normalises the body of an instant payment notification (IPN), accepting either of the field
//!   names the gateway has used for each value.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::NowPaymentsApi;
pub use config::NowPaymentsConfig;
pub use data_objects::{first_string_field, Invoice, IpnNotification, NewInvoice};
pub use error::NowPaymentsApiError;
