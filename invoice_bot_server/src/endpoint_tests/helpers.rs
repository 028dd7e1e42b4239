use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
    Error,
};
use invoice_engine::{
    events::{EventHandlers, EventHooks, OrderPaidEvent},
    test_utils::prepare_env::{prepare_test_env, random_db_path, tear_down_test_env},
    IpnApi,
    SqliteDatabase,
};
use ipn_common::Secret;
use log::debug;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    config::IPN_SIGNATURE_HEADER,
    helpers::{calculate_ipn_signature, canonical_json},
    middleware::IpnSignatureMiddlewareFactory,
    routes::{health, IpnWebhookRoute},
};

// DO NOT re-use this secret anywhere.
pub const IPN_SECRET: &str = "7xFq2rUu9dWm3YtLs0HbKcVaEjPn5GoZ";

pub async fn test_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

/// Deletes a database made by [`test_db`]. Call it last; every clone of `db` stops working.
pub async fn tear_down(db: SqliteDatabase) {
    tear_down_test_env(db).await
}

/// Signs `body` the way the gateway does: HMAC-SHA512 over the canonical JSON, hex encoded.
pub fn sign(body: &str) -> String {
    let value: Value = serde_json::from_str(body).expect("test bodies must be valid JSON");
    calculate_ipn_signature(IPN_SECRET, canonical_json(&value).as_bytes()).expect("HMAC takes any key")
}

/// Collects every `OrderPaidEvent` published while the returned `IpnApi` is alive.
#[derive(Default, Clone)]
pub struct PaidOrders {
    events: Arc<Mutex<Vec<OrderPaidEvent>>>,
}

impl PaidOrders {
    pub fn order_ids(&self) -> Vec<i64> {
        self.events.lock().unwrap().iter().map(|e| e.order.id).collect()
    }
}

/// An `IpnApi` whose order-paid hook records into `paid`. The handle finishes once the api has been dropped and every
/// event has been handled.
pub fn ipn_api(db: &SqliteDatabase, paid: &PaidOrders) -> (IpnApi<SqliteDatabase>, JoinHandle<()>) {
    let mut hooks = EventHooks::default();
    let paid = paid.clone();
    hooks.on_order_paid(move |ev| {
        let paid = paid.clone();
        Box::pin(async move { paid.events.lock().unwrap().push(ev) })
    });
    let mut handlers = EventHandlers::new(8, hooks);
    let producers = handlers.producers();
    let handler = handlers.on_order_paid.take().expect("hook was registered");
    let join = tokio::spawn(handler.start_handler());
    (IpnApi::new(db.clone(), producers), join)
}

/// The same routes the server mounts, backed by `api`.
pub async fn ipn_service(
    api: IpnApi<SqliteDatabase>,
    checks: bool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let secret = Secret::new(IPN_SECRET.to_string());
    let app = App::new().app_data(web::Data::new(api)).service(health).service(
        web::scope("/ipn")
            .wrap(IpnSignatureMiddlewareFactory::new(IPN_SIGNATURE_HEADER, secret, checks))
            .service(IpnWebhookRoute::<SqliteDatabase>::new()),
    );
    test::init_service(app).await
}

/// Posts `body` to `/ipn`, with `signature` in the signature header if given. Errors raised by middleware are turned
/// into the response the client would see.
pub async fn post_ipn<S, B>(service: &S, body: &str, signature: Option<&str>) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let mut req = TestRequest::post().uri("/ipn").insert_header(ContentType::json()).set_payload(body.to_string());
    if let Some(sig) = signature {
        req = req.insert_header((IPN_SIGNATURE_HEADER, sig));
    }
    debug!("Posting IPN {body}");
    call(service, req).await
}

pub async fn get<S, B>(service: &S, path: &str) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    call(service, TestRequest::get().uri(path)).await
}

async fn call<S, B>(service: &S, req: TestRequest) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    match test::try_call_service(service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().unwrap();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}
