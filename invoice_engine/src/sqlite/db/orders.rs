use chrono::Utc;
use ipn_common::UsdAmount;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStats, OrderStatusType},
    traits::InvoiceGatewayError,
};

const ORDER_COLUMNS: &str = "id, created_at, updated_at, chat_id, amount_usd, invoice_id, invoice_url, status";

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, InvoiceGatewayError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO orders (created_at, updated_at, chat_id, amount_usd, status) VALUES ($1, $2, $3, $4, $5) \
         RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(now)
        .bind(now)
        .bind(order.chat_id)
        .bind(order.amount_usd)
        .bind(OrderStatusType::Created.to_string())
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Order #{} created for chat {} ({})", order.id, order.chat_id, order.amount_usd);
    Ok(order)
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, InvoiceGatewayError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the order the given invoice was issued for. `invoice_id` carries a unique index, so there is at most one.
pub async fn fetch_order_by_invoice(
    invoice_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, InvoiceGatewayError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE invoice_id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(invoice_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Sets the invoice details on an order that does not have an invoice yet.
///
/// The `invoice_id IS NULL` guard makes this safe against two concurrent attempts for the same order: exactly one of
/// them wins.
pub async fn attach_invoice(
    order_id: i64,
    invoice_id: &str,
    invoice_url: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, InvoiceGatewayError> {
    let sql = format!(
        "UPDATE orders SET invoice_id = $1, invoice_url = $2, status = $3, updated_at = $4 WHERE id = $5 AND \
         invoice_id IS NULL RETURNING {ORDER_COLUMNS}"
    );
    let result = sqlx::query_as::<_, Order>(&sql)
        .bind(invoice_id)
        .bind(invoice_url)
        .bind(OrderStatusType::InvoiceCreated.to_string())
        .bind(Utc::now())
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await;
    match result {
        Ok(Some(order)) => {
            debug!("🗃️ Invoice {invoice_id} attached to order #{order_id}");
            Ok(order)
        },
        Ok(None) => match fetch_order_by_id(order_id, conn).await? {
            Some(_) => Err(InvoiceGatewayError::InvoiceAlreadyAttached(order_id)),
            None => Err(InvoiceGatewayError::OrderNotFound(order_id)),
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(InvoiceGatewayError::DuplicateInvoice(invoice_id.to_string()))
        },
        Err(e) => Err(e.into()),
    }
}

/// Overwrites the order status. Returns the updated order, or `None` if the order does not exist.
pub async fn update_order_status(
    order_id: i64,
    status: &OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, InvoiceGatewayError> {
    let sql = format!("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    trace!("🗃️ Status of order #{order_id} set to {status}. Order exists: {}", order.is_some());
    Ok(order)
}

pub async fn order_stats(conn: &mut SqliteConnection) -> Result<OrderStats, InvoiceGatewayError> {
    let (total, paid, sum_all, sum_paid) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN lower(status) IN ('confirmed', 'finished') THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(amount_usd), 0),
            COALESCE(SUM(CASE WHEN lower(status) IN ('confirmed', 'finished') THEN amount_usd ELSE 0 END), 0)
        FROM orders
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok(OrderStats::new(total, paid, UsdAmount::from_cents(sum_all), UsdAmount::from_cents(sum_paid)))
}
