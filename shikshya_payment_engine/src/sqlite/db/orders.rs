use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, PaymentMethod},
    traits::StorageError,
};

/// Inserts a new pending order into the database using the given connection. This is not atomic. You can embed
/// this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection
/// argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StorageError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                course_id,
                amount,
                commission_percentage,
                payment_method,
                payment_reference,
                transaction_uuid
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.course_id)
    .bind(order.amount.value())
    .bind(order.commission_percentage)
    .bind(order.payment_method.to_string())
    .bind(order.payment_reference)
    .bind(order.transaction_uuid)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// All of the user's orders created in the checkout batch identified by `uuid`.
pub async fn fetch_orders_by_transaction_uuid(
    user_id: &str,
    uuid: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders =
        sqlx::query_as("SELECT * FROM orders WHERE transaction_uuid = $1 AND user_id = $2 ORDER BY created_at ASC, id ASC")
            .bind(uuid)
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(orders)
}

/// All of the user's orders whose stored provider payment reference matches (the Khalti pidx captured at
/// checkout-initiation time).
pub async fn fetch_orders_by_payment_reference(
    user_id: &str,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders =
        sqlx::query_as("SELECT * FROM orders WHERE payment_reference = $1 AND user_id = $2 ORDER BY created_at ASC, id ASC")
            .bind(reference)
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(orders)
}

/// The user's pending orders for the given payment method, most recent first. The last-resort correlation
/// strategy when redirect data and client state have both been lost.
pub async fn fetch_pending_orders(
    user_id: &str,
    method: PaymentMethod,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        "SELECT * FROM orders WHERE user_id = $1 AND status = 'Pending' AND payment_method = $2 ORDER BY created_at \
         DESC, id DESC",
    )
    .bind(user_id)
    .bind(method.to_string())
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// The conditional `Pending → Completed` transition. The status guard lives in the WHERE clause, so this is a
/// genuine compare-and-set: a replay or a lost race returns `None` and mutates nothing.
pub async fn complete_order(
    id: i64,
    payment_reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StorageError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = 'Completed', payment_reference = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 \
         AND status = 'Pending' RETURNING *",
    )
    .bind(payment_reference)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    if let Some(order) = &result {
        debug!("🗃️ Order #{} completed with payment reference [{payment_reference}]", order.id);
    }
    Ok(result)
}
