use invoice_engine::{db_types::OrderStatusType, InvoiceFlowApi, InvoiceGatewayDatabase, OrderManagement, SqliteDatabase};
use ipn_common::UsdAmount;
use nowpayments_tools::{Invoice, NowPaymentsApiError};

use super::{
    helpers::{tear_down, test_db},
    mocks::MockInvoiceIssuer,
};
use crate::bot::{replies::NOT_AUTHORIZED, Command, CommandContext};

const ADMIN: i64 = 4242;
const CHAT: i64 = 100;

fn context(db: &SqliteDatabase, issuer: MockInvoiceIssuer) -> CommandContext<SqliteDatabase, MockInvoiceIssuer> {
    CommandContext::new(InvoiceFlowApi::new(db.clone()), issuer, ADMIN)
}

fn issuing_invoices() -> MockInvoiceIssuer {
    let mut issuer = MockInvoiceIssuer::new();
    issuer.expect_create_invoice().returning(|_, order_id| {
        Ok(Invoice { invoice_id: format!("inv_{order_id}"), invoice_url: format!("https://pay.example/{order_id}") })
    });
    issuer
}

fn failing_with(error: fn() -> NowPaymentsApiError) -> MockInvoiceIssuer {
    let mut issuer = MockInvoiceIssuer::new();
    issuer.expect_create_invoice().times(1).returning(move |_, _| Err(error()));
    issuer
}

#[tokio::test]
async fn only_the_admin_is_served() {
    let db = test_db().await;
    let mut issuer = MockInvoiceIssuer::new();
    issuer.expect_create_invoice().never();
    let ctx = context(&db, issuer);

    for cmd in [Command::Start, Command::Pay("5".into()), Command::Order("1".into()), Command::Stats, Command::Help] {
        assert_eq!(ctx.reply(Some(7), CHAT, cmd.clone()).await, NOT_AUTHORIZED);
        assert_eq!(ctx.reply(None, CHAT, cmd).await, NOT_AUTHORIZED);
    }
    assert_eq!(db.stats_summary().await.unwrap().total, 0);
    tear_down(db).await;
}

#[tokio::test]
async fn start_and_help() {
    let db = test_db().await;
    let ctx = context(&db, MockInvoiceIssuer::new());
    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Start).await;
    assert!(reply.contains("running"), "{reply}");
    assert!(reply.contains("/pay"), "{reply}");
    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Help).await;
    assert!(reply.contains("/stats"), "{reply}");
    tear_down(db).await;
}

#[tokio::test]
async fn pay_issues_a_link() {
    let db = test_db().await;
    let mut issuer = MockInvoiceIssuer::new();
    issuer
        .expect_create_invoice()
        .withf(|amount, order_id| *amount == UsdAmount::from_cents(550) && *order_id == 1)
        .times(1)
        .returning(|_, _| Ok(Invoice { invoice_id: "inv_1".into(), invoice_url: "https://pay.example/1".into() }));
    let ctx = context(&db, issuer);

    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Pay("5.50".into())).await;
    assert!(reply.contains("Order #1"), "{reply}");
    assert!(reply.contains("$5.50"), "{reply}");
    assert!(reply.contains("https://pay.example/1"), "{reply}");

    let order = db.fetch_order(1).await.unwrap().unwrap();
    assert_eq!(order.chat_id, CHAT);
    assert_eq!(order.status, OrderStatusType::InvoiceCreated);
    assert_eq!(order.invoice_id.as_deref(), Some("inv_1"));
    assert_eq!(order.invoice_url.as_deref(), Some("https://pay.example/1"));
    tear_down(db).await;
}

#[tokio::test]
async fn pay_rejects_bad_amounts() {
    let db = test_db().await;
    let mut issuer = MockInvoiceIssuer::new();
    issuer.expect_create_invoice().never();
    let ctx = context(&db, issuer);

    for amount in ["", "abc", "0", "0.00", "-5", "1.234", "5,50", "1e3"] {
        let reply = ctx.reply(Some(ADMIN), CHAT, Command::Pay(amount.into())).await;
        assert!(reply.contains("not a valid amount"), "{amount}: {reply}");
    }
    assert_eq!(db.stats_summary().await.unwrap().total, 0);
    tear_down(db).await;
}

#[tokio::test]
async fn gateway_failures_are_recorded() {
    let cases: [(fn() -> NowPaymentsApiError, OrderStatusType); 3] = [
        (|| NowPaymentsApiError::QueryError { status: 403, message: "Invalid api key".into() }, OrderStatusType::InvoiceHttpError),
        (|| NowPaymentsApiError::IncompleteResponse("invoice_url"), OrderStatusType::InvoiceError),
        (|| NowPaymentsApiError::RestResponseError("operation timed out".into()), OrderStatusType::InvoiceException),
    ];
    for (error, expected) in cases {
        let db = test_db().await;
        let ctx = context(&db, failing_with(error));
        let reply = ctx.reply(Some(ADMIN), CHAT, Command::Pay("12".into())).await;
        assert!(reply.contains("Could not create an invoice for order #1"), "{reply}");
        assert!(reply.contains(expected.as_str()), "{reply}");
        let order = db.fetch_order(1).await.unwrap().unwrap();
        assert_eq!(order.status, expected);
        assert!(order.invoice_id.is_none());
        tear_down(db).await;
    }
}

#[tokio::test]
async fn order_details() {
    let db = test_db().await;
    let ctx = context(&db, issuing_invoices());
    ctx.reply(Some(ADMIN), CHAT, Command::Pay("5".into())).await;

    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Order("1".into())).await;
    assert!(reply.contains("Order #1"), "{reply}");
    assert!(reply.contains("Amount: $5.00"), "{reply}");
    assert!(reply.contains("Status: invoice_created"), "{reply}");
    assert!(reply.contains("Invoice: https://pay.example/1"), "{reply}");

    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Order("#1".into())).await;
    assert!(reply.contains("Order #1"), "{reply}");
    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Order("99".into())).await;
    assert!(reply.contains("does not exist"), "{reply}");
    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Order("latest".into())).await;
    assert!(reply.contains("not an order number"), "{reply}");
    tear_down(db).await;
}

#[tokio::test]
async fn stats_summary() {
    let db = test_db().await;
    let ctx = context(&db, issuing_invoices());
    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Stats).await;
    assert!(reply.contains("0 total"), "{reply}");

    ctx.reply(Some(ADMIN), CHAT, Command::Pay("5".into())).await;
    ctx.reply(Some(ADMIN), CHAT, Command::Pay("2.50".into())).await;
    db.set_order_status(1, OrderStatusType::Finished).await.unwrap();

    let reply = ctx.reply(Some(ADMIN), CHAT, Command::Stats).await;
    assert!(reply.contains("2 total, 1 paid, 1 pending"), "{reply}");
    assert!(reply.contains("Total value: $7.50"), "{reply}");
    assert!(reply.contains("Paid value: $5.00"), "{reply}");
    tear_down(db).await;
}
