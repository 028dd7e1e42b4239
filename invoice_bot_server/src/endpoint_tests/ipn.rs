use actix_web::http::StatusCode;
use invoice_engine::{
    db_types::{Order, OrderStatusType},
    InvoiceFlowApi,
    OrderManagement,
    SqliteDatabase,
};
use ipn_common::UsdAmount;

use super::helpers::{get, ipn_api, ipn_service, post_ipn, sign, tear_down, test_db, PaidOrders};

const ACK: &str = r#"{"ok":true}"#;

async fn order_with_invoice(db: &SqliteDatabase, invoice_id: &str) -> Order {
    let flow = InvoiceFlowApi::new(db.clone());
    let order = flow.create_order(100, UsdAmount::from_cents(500)).await.unwrap();
    flow.invoice_issued(order.id, invoice_id, "https://pay.example/abc").await.unwrap()
}

fn ipn_body(payment_id: &str, invoice_id: &str, status: &str) -> String {
    format!(
        r#"{{"payment_id":"{payment_id}","invoice_id":"{invoice_id}","payment_status":"{status}","price_amount":5,"price_currency":"usd","pay_currency":"usdttrc20"}}"#
    )
}

#[actix_web::test]
async fn payment_lifecycle() {
    let db = test_db().await;
    let paid = PaidOrders::default();
    let (api, join) = ipn_api(&db, &paid);
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;
    assert_eq!(order.status, OrderStatusType::InvoiceCreated);

    let body = ipn_body("p1", "inv_abc", "waiting");
    let (status, res) = post_ipn(&service, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, ACK);
    let order = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Waiting);

    let body = ipn_body("p1", "inv_abc", "finished");
    let (status, res) = post_ipn(&service, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, ACK);
    let order = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Finished);
    let event = db.fetch_payment_event("p1").await.unwrap().unwrap();
    assert_eq!(event.order_id, order.id);
    assert_eq!(event.status, OrderStatusType::Finished);
    assert_eq!(event.raw_payload, body);

    // A replay is acknowledged, but changes nothing and does not alert again
    let (status, _) = post_ipn(&service, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_payment_events_for_order(order.id).await.unwrap().len(), 1);

    drop(service);
    join.await.unwrap();
    assert_eq!(paid.order_ids(), vec![order.id]);
    tear_down(db).await;
}

#[actix_web::test]
async fn invalid_signature_is_rejected() {
    let db = test_db().await;
    let paid = PaidOrders::default();
    let (api, join) = ipn_api(&db, &paid);
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let body = ipn_body("p1", "inv_abc", "finished");
    let forged = sign(&ipn_body("p1", "inv_abc", "waiting"));
    let (status, res) = post_ipn(&service, &body, Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(res, r#"{"error":"Authentication Error. The signature does not match the request body."}"#);

    let (status, _) = post_ipn(&service, &body, Some("not-hex")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unchanged = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatusType::InvoiceCreated);
    assert!(db.fetch_payment_event("p1").await.unwrap().is_none());
    drop(service);
    join.await.unwrap();
    assert!(paid.order_ids().is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let (status, res) = post_ipn(&service, &ipn_body("p1", "inv_abc", "finished"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(res.contains("No signature header"), "{res}");
    let unchanged = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatusType::InvoiceCreated);
    tear_down(db).await;
}

#[actix_web::test]
async fn unparsable_body_is_rejected() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let (status, res) = post_ipn(&service, "{not json", Some("00ff")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(res.contains("not valid JSON"), "{res}");
    tear_down(db).await;
}

#[actix_web::test]
async fn key_order_and_whitespace_do_not_matter() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let signed = r#"{"fee":{"currency":"usdttrc20","depositFee":0.1},"invoice_id":"inv_abc","payment_id":"p7","payment_status":"confirming"}"#;
    let sent = r#"{
        "payment_status": "confirming",
        "payment_id": "p7",
        "invoice_id": "inv_abc",
        "fee": { "depositFee": 0.1, "currency": "usdttrc20" }
    }"#;
    let (status, res) = post_ipn(&service, sent, Some(&sign(signed))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, ACK);
    let order = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Confirming);
    // The payload is stored exactly as received
    assert_eq!(db.fetch_payment_event("p7").await.unwrap().unwrap().raw_payload, sent);
    tear_down(db).await;
}

#[actix_web::test]
async fn unknown_invoice_is_acknowledged() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let body = ipn_body("p9", "inv_other", "finished");
    let (status, res) = post_ipn(&service, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, ACK);
    assert!(db.fetch_payment_event("p9").await.unwrap().is_none());
    let unchanged = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatusType::InvoiceCreated);
    tear_down(db).await;
}

#[actix_web::test]
async fn notifications_without_ids_are_acknowledged() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    for body in [r#"{"invoice_id":"inv_abc","payment_status":"finished"}"#, r#"{"payment_id":"p1","status":"finished"}"#, "[]"]
    {
        let (status, res) = post_ipn(&service, body, Some(&sign(body))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(res, ACK);
    }
    let unchanged = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatusType::InvoiceCreated);
    assert!(db.fetch_payment_events_for_order(order.id).await.unwrap().is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn alternative_field_names_are_accepted() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let body = r#"{"id":4455,"invoice":"inv_abc","status":"Confirmed"}"#;
    let (status, _) = post_ipn(&service, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    let order = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Confirmed);
    assert!(db.fetch_payment_event("4455").await.unwrap().is_some());
    tear_down(db).await;
}

#[actix_web::test]
async fn checks_can_be_disabled() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, false).await;
    let order = order_with_invoice(&db, "inv_abc").await;

    let (status, res) = post_ipn(&service, &ipn_body("p1", "inv_abc", "partially_paid"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, ACK);
    let order = db.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::PartiallyPaid);
    tear_down(db).await;
}

#[actix_web::test]
async fn health_check() {
    let db = test_db().await;
    let (api, _join) = ipn_api(&db, &PaidOrders::default());
    let service = ipn_service(api, true).await;
    let (status, body) = get(&service, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok","service":"invoice_bot_server"}"#);
    tear_down(db).await;
}

#[actix_web::test]
async fn confirm_replay_then_forgery() {
    let db = test_db().await;
    let paid = PaidOrders::default();
    let (api, join) = ipn_api(&db, &paid);
    let service = ipn_service(api, true).await;
    let flow = InvoiceFlowApi::new(db.clone());
    let order = flow.create_order(100, "5.0".parse().unwrap()).await.unwrap();
    assert_eq!(order.id, 1);
    assert_eq!(order.status, OrderStatusType::Created);
    let order = flow.invoice_issued(1, "inv_abc", "https://pay.example/abc").await.unwrap();
    assert_eq!(order.status, OrderStatusType::InvoiceCreated);

    let body = r#"{"payment_id":"p1","invoice_id":"inv_abc","payment_status":"confirmed"}"#;
    let (status, _) = post_ipn(&service, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_order(1).await.unwrap().unwrap().status, OrderStatusType::Confirmed);
    let event = db.fetch_payment_event("p1").await.unwrap().unwrap();
    assert_eq!(event.status, OrderStatusType::Confirmed);

    // Replay
    let (status, _) = post_ipn(&service, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_order(1).await.unwrap().unwrap().status, OrderStatusType::Confirmed);
    assert_eq!(db.fetch_payment_events_for_order(1).await.unwrap().len(), 1);

    // Forgery
    let forged = r#"{"payment_id":"p1","invoice_id":"inv_abc","payment_status":"refunded"}"#;
    let (status, _) = post_ipn(&service, forged, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(db.fetch_order(1).await.unwrap().unwrap().status, OrderStatusType::Confirmed);
    assert_eq!(db.fetch_payment_event("p1").await.unwrap().unwrap().raw_payload, body);

    drop(service);
    join.await.unwrap();
    assert_eq!(paid.order_ids(), vec![1]);
    tear_down(db).await;
}
