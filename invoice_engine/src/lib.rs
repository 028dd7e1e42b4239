//! Invoice Engine
//!
//! The invoice engine keeps track of orders for crypto payment invoices and reconciles payment notifications from the
//! payment gateway against them. It is gateway-agnostic: it never issues invoices or verifies notifications itself.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`] and [`mod@sqlite`]). The traits define what a backend must provide; SQLite is the
//!    supported backend. The data types stored in the database live in [`mod@db_types`].
//! 2. The public API ([`mod@engine_api`]). [`InvoiceFlowApi`] manages the order and invoice lifecycle, and [`IpnApi`]
//!    applies verified payment updates.
//! 3. Events ([`mod@events`]). When an order becomes paid an [`events::OrderPaidEvent`] is published to whoever
//!    registered a hook for it.
pub mod db_types;
pub mod engine_api;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use engine_api::{
    errors::InvoiceFlowError,
    invoice_flow_api::InvoiceFlowApi,
    ipn_api::{IpnApi, IpnOutcome},
    order_objects::{InvoiceFailure, OrderDetail},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{InvoiceGatewayDatabase, InvoiceGatewayError, OrderManagement, PaymentRecorded, UpsertResult};
