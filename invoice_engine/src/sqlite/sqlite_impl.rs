//! `SqliteDatabase` is a concrete implementation of an invoice engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::Migrator, SqlitePool};

use super::db::{new_pool, orders, payment_events};
use crate::{
    db_types::{NewOrder, NewPaymentEvent, Order, OrderStats, OrderStatusType, PaymentEvent},
    traits::{InvoiceGatewayDatabase, InvoiceGatewayError, OrderManagement, PaymentRecorded, UpsertResult},
};

static MIGRATOR: Migrator = sqlx::migrate!("./src/sqlite/migrations");

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl InvoiceGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, InvoiceGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn attach_invoice(
        &self,
        order_id: i64,
        invoice_id: &str,
        invoice_url: &str,
    ) -> Result<Order, InvoiceGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::attach_invoice(order_id, invoice_id, invoice_url, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn set_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, InvoiceGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(order_id, &status, &mut tx)
            .await?
            .ok_or(InvoiceGatewayError::OrderNotFound(order_id))?;
        tx.commit().await?;
        Ok(order)
    }

    async fn upsert_payment_event(&self, event: NewPaymentEvent) -> Result<UpsertResult, InvoiceGatewayError> {
        let mut tx = self.pool.begin().await?;
        let (_, result) = payment_events::upsert_payment_event(&event, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn record_payment_event(&self, event: NewPaymentEvent) -> Result<PaymentRecorded, InvoiceGatewayError> {
        // SQLite only queues writers on the busy timeout if they have not read yet, so write before reading
        let mut tx = self.pool.begin().await?;
        let (stored, upsert) = payment_events::upsert_payment_event(&event, &mut tx).await?;
        let previous = orders::fetch_order_by_id(event.order_id, &mut tx)
            .await?
            .ok_or(InvoiceGatewayError::OrderNotFound(event.order_id))?;
        let order = orders::update_order_status(event.order_id, &event.status, &mut tx)
            .await?
            .ok_or(InvoiceGatewayError::OrderNotFound(event.order_id))?;
        tx.commit().await?;
        trace!("🗃️ Payment {} recorded. Order #{} {} -> {}", stored.payment_id, order.id, previous.status, order.status);
        Ok(PaymentRecorded { previous_status: previous.status, order, event: stored, upsert })
    }

    async fn close(&mut self) -> Result<(), InvoiceGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, InvoiceGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(order_id, &mut conn).await
    }

    async fn fetch_order_by_invoice(&self, invoice_id: &str) -> Result<Option<Order>, InvoiceGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_invoice(invoice_id, &mut conn).await
    }

    async fn fetch_payment_event(&self, payment_id: &str) -> Result<Option<PaymentEvent>, InvoiceGatewayError> {
        let mut conn = self.pool.acquire().await?;
        payment_events::fetch_payment_event(payment_id, &mut conn).await
    }

    async fn fetch_payment_events_for_order(&self, order_id: i64) -> Result<Vec<PaymentEvent>, InvoiceGatewayError> {
        let mut conn = self.pool.acquire().await?;
        payment_events::fetch_events_for_order(order_id, &mut conn).await
    }

    async fn stats_summary(&self) -> Result<OrderStats, InvoiceGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::order_stats(&mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the `orders` and `payment_events` tables if they do not exist yet. Migrations that have already been
    /// applied are skipped.
    pub async fn migrate(&self) -> Result<(), InvoiceGatewayError> {
        MIGRATOR.run(&self.pool).await.map_err(|e| InvoiceGatewayError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database schema is up to date");
        Ok(())
    }
}
