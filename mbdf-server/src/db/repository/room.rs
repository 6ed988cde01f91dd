//! Room Repository

use super::{RepoError, RepoResult};
use shared::models::{Room, RoomCreate, RoomRole};
use sqlx::SqlitePool;

/// Create a room and its admin membership in one transaction.
///
/// The creator always becomes the room admin; a room without an admin would
/// be unmanageable (nobody could archive it or approve access requests).
pub async fn create(pool: &SqlitePool, data: RoomCreate, creator_id: i64) -> RepoResult<Room> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO room (id, name, substance_identifier, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 'active', ?4, ?4)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.substance_identifier)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO membership (room_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(id)
    .bind(creator_id)
    .bind(RoomRole::Admin)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create room".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Room>> {
    let row = sqlx::query_as::<_, Room>(
        "SELECT id, name, substance_identifier, status, archived_at, archive_reason, \
         created_at, updated_at FROM room WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a room or fail with NotFound
pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Room> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Room {id} not found")))
}
