//! Membership Repository

use super::{RepoError, RepoResult};
use shared::models::{Membership, RoomRole};
use sqlx::SqlitePool;

pub async fn add(
    pool: &SqlitePool,
    room_id: i64,
    user_id: i64,
    role: RoomRole,
) -> RepoResult<Membership> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO membership (room_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(room_id)
    .bind(user_id)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("User {user_id} is already a member of room {room_id}"))
        }
        other => other,
    })?;

    Ok(Membership {
        room_id,
        user_id,
        role,
        created_at: now,
    })
}

pub async fn find(
    pool: &SqlitePool,
    room_id: i64,
    user_id: i64,
) -> RepoResult<Option<Membership>> {
    let row = sqlx::query_as::<_, Membership>(
        "SELECT room_id, user_id, role, created_at FROM membership \
         WHERE room_id = ? AND user_id = ?",
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<Membership>> {
    let rows = sqlx::query_as::<_, Membership>(
        "SELECT room_id, user_id, role, created_at FROM membership \
         WHERE room_id = ? ORDER BY created_at",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membership WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Membership role of a user in a room, or NotFound when the user is not a
/// member. Core operations use this for explicit capability checks.
pub async fn role_of(pool: &SqlitePool, room_id: i64, user_id: i64) -> RepoResult<RoomRole> {
    find(pool, room_id, user_id)
        .await?
        .map(|m| m.role)
        .ok_or_else(|| {
            RepoError::NotFound(format!("User {user_id} is not a member of room {room_id}"))
        })
}
