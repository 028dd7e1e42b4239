//! Engine events. The only event the engine emits is [`OrderPaidEvent`]; hook into it with
//! [`EventHooks::on_order_paid`].
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::OrderPaidEvent;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
