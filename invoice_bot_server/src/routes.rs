//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate module.
//!
//! Handlers run on the actix worker threads, so anything slow (database calls, outbound requests) must be awaited,
//! never blocked on.
use actix_web::{get, web, HttpResponse, Responder};
use invoice_engine::{db_types::PaymentUpdate, InvoiceGatewayDatabase, IpnApi, IpnOutcome};
use log::*;
use nowpayments_tools::IpnNotification;
use serde_json::Value;

use crate::{
    data_objects::{HealthResponse, IpnAck},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(HealthResponse::default())
}

#[get("/")]
pub async fn index() -> impl Responder {
    trace!("💻️ Received index request");
    HttpResponse::Ok().json(HealthResponse::default())
}

//----------------------------------------------   IPN  ----------------------------------------------------
route!(ipn_webhook => Post "" impl InvoiceGatewayDatabase);
/// Route handler for gateway payment notifications.
///
/// By the time a request gets here its signature has been checked (see
/// [`crate::middleware::IpnSignatureMiddlewareFactory`]). Every notification that passes authentication is
/// acknowledged with `200 {"ok":true}`, including notifications that cannot be matched to an order, so that the gateway
/// does not keep re-sending them. The only exception is a storage failure, which returns a 500 so that the gateway
/// retries later.
pub async fn ipn_webhook<B>(body: web::Bytes, api: web::Data<IpnApi<B>>) -> Result<HttpResponse, ServerError>
where B: InvoiceGatewayDatabase {
    let value = match serde_json::from_slice::<Value>(&body) {
        Ok(v) => v,
        Err(e) => {
            info!("💻️ Ignoring IPN with an unreadable body. {e}");
            return Ok(HttpResponse::Ok().json(IpnAck::ok()));
        },
    };
    let notification = IpnNotification::from_value(&value);
    if !notification.is_actionable() {
        info!("💻️ Ignoring IPN without a payment id or invoice id. {notification:?}");
        return Ok(HttpResponse::Ok().json(IpnAck::ok()));
    }
    trace!("💻️ IPN received: {notification:?}");
    let raw = String::from_utf8_lossy(&body);
    let update =
        PaymentUpdate::new(&notification.payment_id, &notification.invoice_id, notification.status.as_str(), &raw);
    match api.process_payment_update(update).await {
        Ok(IpnOutcome::UnknownInvoice(invoice)) => debug!("💻️ IPN for unknown invoice {invoice} acknowledged"),
        Ok(IpnOutcome::Recorded { order, .. }) => debug!("💻️ IPN processed. {order}"),
        Err(e) => {
            error!("💻️ Could not store IPN for payment {}. {e}", notification.payment_id);
            return Err(e.into());
        },
    }
    Ok(HttpResponse::Ok().json(IpnAck::ok()))
}
