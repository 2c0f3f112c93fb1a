use log::trace;
use sqlx::SqliteConnection;

use crate::traits::StorageError;

pub async fn add_item(user_id: &str, course_id: &str, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    sqlx::query("INSERT INTO cart_items (user_id, course_id) VALUES ($1, $2) ON CONFLICT (user_id, course_id) DO NOTHING")
        .bind(user_id)
        .bind(course_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Removes the cart item for a settled course. Returns `false` if there was nothing to remove, which is the
/// normal case on a replay.
pub async fn remove_item(user_id: &str, course_id: &str, conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .execute(conn)
        .await?;
    let removed = result.rows_affected() > 0;
    trace!("🗃️ Cart item for user [{user_id}], course [{course_id}] removed: {removed}");
    Ok(removed)
}
