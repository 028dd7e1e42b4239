use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPaymentEvent, PaymentEvent},
    traits::{InvoiceGatewayError, UpsertResult},
};

const EVENT_COLUMNS: &str = "payment_id, order_id, status, raw_payload, updated_at";

pub async fn fetch_payment_event(
    payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentEvent>, InvoiceGatewayError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM payment_events WHERE payment_id = $1");
    let event = sqlx::query_as::<_, PaymentEvent>(&sql).bind(payment_id).fetch_optional(conn).await?;
    Ok(event)
}

pub async fn fetch_events_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentEvent>, InvoiceGatewayError> {
    let sql =
        format!("SELECT {EVENT_COLUMNS} FROM payment_events WHERE order_id = $1 ORDER BY updated_at DESC, payment_id");
    let events = sqlx::query_as::<_, PaymentEvent>(&sql).bind(order_id).fetch_all(conn).await?;
    Ok(events)
}

/// Inserts the event, or overwrites `status`, `raw_payload` and `updated_at` if the payment id is already known.
///
/// Both branches start with a write, so inside a transaction the write lock is taken before anything is read. Concurrent
/// writers then queue on the busy timeout instead of failing with `SQLITE_BUSY` when upgrading a read transaction.
/// Returns [`InvoiceGatewayError::OrderNotFound`] if the event refers to an order that does not exist.
pub async fn upsert_payment_event(
    event: &NewPaymentEvent,
    conn: &mut SqliteConnection,
) -> Result<(PaymentEvent, UpsertResult), InvoiceGatewayError> {
    let now = Utc::now();
    let sql = format!(
        "UPDATE payment_events SET status = $1, raw_payload = $2, updated_at = $3 WHERE payment_id = $4 RETURNING \
         {EVENT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, PaymentEvent>(&sql)
        .bind(event.status.to_string())
        .bind(&event.raw_payload)
        .bind(now)
        .bind(&event.payment_id)
        .fetch_optional(&mut *conn)
        .await?;
    let (stored, result) = match updated {
        Some(stored) => (stored, UpsertResult::Updated),
        None => {
            let sql = format!(
                "INSERT INTO payment_events (payment_id, order_id, status, raw_payload, updated_at) VALUES ($1, $2, $3, \
                 $4, $5) RETURNING {EVENT_COLUMNS}"
            );
            let inserted = sqlx::query_as::<_, PaymentEvent>(&sql)
                .bind(&event.payment_id)
                .bind(event.order_id)
                .bind(event.status.to_string())
                .bind(&event.raw_payload)
                .bind(now)
                .fetch_one(conn)
                .await;
            match inserted {
                Ok(stored) => (stored, UpsertResult::Inserted),
                Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                    return Err(InvoiceGatewayError::OrderNotFound(event.order_id))
                },
                Err(e) => return Err(e.into()),
            }
        },
    };
    debug!("🗃️ Payment event {} for order #{} {result:?} with status {}", stored.payment_id, stored.order_id, stored.status);
    Ok((stored, result))
}
