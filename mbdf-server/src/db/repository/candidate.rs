//! Candidate Repository

use super::{RepoError, RepoResult};
use shared::models::Candidate;
use sqlx::SqlitePool;

const CANDIDATE_SELECT: &str =
    "SELECT id, room_id, user_id, is_selected, created_at FROM candidate";

pub async fn create(pool: &SqlitePool, room_id: i64, user_id: i64) -> RepoResult<Candidate> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO candidate (id, room_id, user_id, is_selected, created_at) \
         VALUES (?1, ?2, ?3, 0, ?4)",
    )
    .bind(id)
    .bind(room_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!(
            "User {user_id} is already nominated in room {room_id}"
        )),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create candidate".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Candidate>> {
    let sql = format!("{CANDIDATE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Candidate>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_user(
    pool: &SqlitePool,
    room_id: i64,
    user_id: i64,
) -> RepoResult<Option<Candidate>> {
    let sql = format!("{CANDIDATE_SELECT} WHERE room_id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, Candidate>(&sql)
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Candidates in nomination order (the stable presentation order)
pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<Candidate>> {
    let sql = format!("{CANDIDATE_SELECT} WHERE room_id = ? ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, Candidate>(&sql)
        .bind(room_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The finalized candidate, if the room's vote has concluded
pub async fn find_selected(pool: &SqlitePool, room_id: i64) -> RepoResult<Option<Candidate>> {
    let sql = format!("{CANDIDATE_SELECT} WHERE room_id = ? AND is_selected = 1");
    let row = sqlx::query_as::<_, Candidate>(&sql)
        .bind(room_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidate WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
