use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::Enrollment, traits::StorageError};

/// Creates the enrollment if it does not exist, returning `true` if a row was actually inserted.
///
/// The `(user_id, course_id)` uniqueness constraint makes this safe under concurrent double-invocation: at
/// most one caller observes an insert.
pub async fn insert_if_absent(
    user_id: &str,
    course_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, StorageError> {
    let result = sqlx::query(
        "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .execute(conn)
    .await?;
    let inserted = result.rows_affected() > 0;
    if inserted {
        debug!("🗃️ User [{user_id}] enrolled in course [{course_id}]");
    }
    Ok(inserted)
}

pub async fn fetch_enrollment(
    user_id: &str,
    course_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Enrollment>, sqlx::Error> {
    let enrollment = sqlx::query_as("SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(conn)
        .await?;
    Ok(enrollment)
}
