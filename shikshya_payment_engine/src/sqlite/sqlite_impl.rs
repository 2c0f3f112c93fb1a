//! `SqliteDatabase` is a concrete implementation of a settlement engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`SettlementDatabase`] trait. The
//! conditional-write requirements of the trait map directly onto guarded UPDATEs and `ON CONFLICT DO NOTHING`
//! inserts, so no explicit locking is needed anywhere.
use std::fmt::Debug;

use sqlx::SqlitePool;

use super::db::{cart, enrollments, new_pool, orders, settings};
use crate::{
    db_types::{Enrollment, NewOrder, Order, PaymentMethod},
    traits::{SettlementDatabase, StorageError},
};

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

impl SqliteDatabase {
    /// Creates a new connection pool with the given URL and returns a new instance of `SqliteDatabase`.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_by_transaction_uuid(&self, user_id: &str, uuid: &str) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_by_transaction_uuid(user_id, uuid, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_by_payment_reference(
        &self,
        user_id: &str,
        reference: &str,
    ) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_by_payment_reference(user_id, reference, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_pending_orders(&self, user_id: &str, method: PaymentMethod) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_pending_orders(user_id, method, &mut conn).await?;
        Ok(orders)
    }

    async fn complete_order(&self, id: i64, payment_reference: &str) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::complete_order(id, payment_reference, &mut conn).await
    }

    async fn enroll_if_absent(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        enrollments::insert_if_absent(user_id, course_id, &mut conn).await
    }

    async fn fetch_enrollment(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let enrollment = enrollments::fetch_enrollment(user_id, course_id, &mut conn).await?;
        Ok(enrollment)
    }

    async fn add_cart_item(&self, user_id: &str, course_id: &str) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        cart::add_item(user_id, course_id, &mut conn).await
    }

    async fn remove_cart_item(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        cart::remove_item(user_id, course_id, &mut conn).await
    }

    async fn platform_commission_rate(&self) -> Result<f64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        settings::platform_commission_rate(&mut conn).await
    }

    async fn set_platform_commission_rate(&self, rate: f64) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        settings::set_platform_commission_rate(rate, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}
