//! # Database management and control.
//!
//! This module defines the interface contracts that order store *backends* must honour.
//!
//! * [`InvoiceGatewayDatabase`] covers every state change: creating orders, attaching invoices, overwriting statuses
//!   and recording payment events.
//! * [`OrderManagement`] provides read-only queries over orders, payment events and aggregate statistics.
//!
//! Every method is a single logical operation and must be atomic: a failure part-way through leaves the store in its
//! prior state.
mod data_objects;
mod invoice_gateway_database;
mod order_management;

pub use data_objects::{PaymentRecorded, UpsertResult};
pub use invoice_gateway_database::{InvoiceGatewayDatabase, InvoiceGatewayError};
pub use order_management::OrderManagement;
