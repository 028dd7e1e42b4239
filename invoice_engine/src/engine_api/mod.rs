//! # Invoice engine public API
//!
//! The API is split along the two independent flows of the system:
//!
//! * [`invoice_flow_api`] drives the operator side: creating orders, recording the outcome of the invoice request and
//!   answering queries about orders and totals.
//! * [`ipn_api`] reconciles verified payment notifications from the gateway against the stored orders, and fires the
//!   [`crate::events::OrderPaidEvent`] hook when an order becomes paid.
//!
//! Both APIs are created by handing them a backend that implements [`crate::traits::InvoiceGatewayDatabase`]:
//!
//! ```rust,ignore
//! use invoice_engine::{InvoiceFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/orders.db", 5).await?;
//! let api = InvoiceFlowApi::new(db);
//! let order = api.create_order(chat_id, "5.00".parse()?).await?;
//! ```
pub mod errors;
pub mod invoice_flow_api;
pub mod ipn_api;
pub mod order_objects;
