//! Access Request Repository

use super::{RepoError, RepoResult};
use shared::models::{AccessRequest, AccessRequestStatus};
use sqlx::SqlitePool;

const REQUEST_SELECT: &str =
    "SELECT id, room_id, user_id, status, created_at, resolved_at FROM access_request";

pub async fn create(pool: &SqlitePool, room_id: i64, user_id: i64) -> RepoResult<AccessRequest> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO access_request (id, room_id, user_id, status, created_at) \
         VALUES (?1, ?2, ?3, 'pending', ?4)",
    )
    .bind(id)
    .bind(room_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create access request".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AccessRequest>> {
    let sql = format!("{REQUEST_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, AccessRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<AccessRequest>> {
    let sql = format!("{REQUEST_SELECT} WHERE room_id = ? ORDER BY created_at");
    let rows = sqlx::query_as::<_, AccessRequest>(&sql)
        .bind(room_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Approve a pending request. Only pending requests can be approved.
pub async fn approve(pool: &SqlitePool, id: i64) -> RepoResult<AccessRequest> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE access_request SET status = 'approved', resolved_at = ? \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Pending access request {id} not found"
        )));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Access request {id} not found")))
}

pub async fn count_by_status(
    pool: &SqlitePool,
    room_id: i64,
    status: AccessRequestStatus,
) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM access_request WHERE room_id = ? AND status = ?")
            .bind(room_id)
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
