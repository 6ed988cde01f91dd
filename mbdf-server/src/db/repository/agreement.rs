//! Agreement Repository

use super::{RepoError, RepoResult};
use shared::models::Agreement;
use sqlx::SqlitePool;

pub async fn create(pool: &SqlitePool, room_id: i64, title: &str) -> RepoResult<Agreement> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO agreement (id, room_id, title, status, created_at) \
         VALUES (?1, ?2, ?3, 'draft', ?4)",
    )
    .bind(id)
    .bind(room_id)
    .bind(title)
    .bind(now)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, Agreement>(
        "SELECT id, room_id, title, status, created_at FROM agreement WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| RepoError::Database("Failed to create agreement".into()))
}

pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<Agreement>> {
    let rows = sqlx::query_as::<_, Agreement>(
        "SELECT id, room_id, title, status, created_at FROM agreement \
         WHERE room_id = ? ORDER BY created_at",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_drafts(pool: &SqlitePool, room_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM agreement WHERE room_id = ? AND status = 'draft'",
    )
    .bind(room_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
