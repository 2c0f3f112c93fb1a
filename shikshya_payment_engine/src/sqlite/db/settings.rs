use sqlx::SqliteConnection;

use crate::traits::StorageError;

/// The live platform default commission percentage. Orders snapshot this at sale time; the live value is only
/// consulted for orders whose snapshot is missing.
pub async fn platform_commission_rate(conn: &mut SqliteConnection) -> Result<f64, StorageError> {
    let rate: f64 = sqlx::query_scalar("SELECT commission_percentage FROM platform_settings WHERE id = 1")
        .fetch_one(conn)
        .await?;
    Ok(rate)
}

pub async fn set_platform_commission_rate(rate: f64, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    sqlx::query("UPDATE platform_settings SET commission_percentage = $1 WHERE id = 1")
        .bind(rate)
        .execute(conn)
        .await?;
    Ok(())
}
