//! Ballot Repository
//!
//! Ballots are keyed by (room, voter, candidate); the upsert is a single
//! atomic statement so concurrent re-submissions can never interleave into a
//! torn row or a duplicate.

use super::RepoResult;
use shared::models::{Ballot, BallotScores};
use sqlx::SqlitePool;

const BALLOT_SELECT: &str = "SELECT room_id, voter_id, candidate_id, technical_score, \
     experience_score, availability_score, communication_score, leadership_score, updated_at \
     FROM ballot";

/// SQL shared by the single and batch write paths. The room-status guard is
/// part of the statement: a ballot that loses a race against an archival
/// transaction finds the room archived at write time and affects zero rows,
/// instead of being silently accepted into the archived room.
pub const BALLOT_UPSERT: &str =
    "INSERT INTO ballot (room_id, voter_id, candidate_id, technical_score, \
     experience_score, availability_score, communication_score, leadership_score, updated_at) \
     SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9 \
     WHERE (SELECT status FROM room WHERE id = ?1) NOT IN ('archived', 'closed') \
     ON CONFLICT(room_id, voter_id, candidate_id) DO UPDATE SET \
     technical_score = excluded.technical_score, \
     experience_score = excluded.experience_score, \
     availability_score = excluded.availability_score, \
     communication_score = excluded.communication_score, \
     leadership_score = excluded.leadership_score, \
     updated_at = excluded.updated_at";

/// Insert or overwrite the (room, voter, candidate) ballot. Last write wins.
///
/// Returns `false` when the status guard suppressed the write because the
/// room is no longer open.
pub async fn upsert(
    pool: &SqlitePool,
    room_id: i64,
    voter_id: i64,
    candidate_id: i64,
    scores: &BallotScores,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(BALLOT_UPSERT)
        .bind(room_id)
        .bind(voter_id)
        .bind(candidate_id)
        .bind(scores.technical_score)
        .bind(scores.experience_score)
        .bind(scores.availability_score)
        .bind(scores.communication_score)
        .bind(scores.leadership_score)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<Ballot>> {
    let sql = format!("{BALLOT_SELECT} WHERE room_id = ?");
    let rows = sqlx::query_as::<_, Ballot>(&sql)
        .bind(room_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ballot WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// The voter's most recently updated ballot in the room (the `my_vote` field
/// of the votes view)
pub async fn find_latest_by_voter(
    pool: &SqlitePool,
    room_id: i64,
    voter_id: i64,
) -> RepoResult<Option<Ballot>> {
    let sql = format!(
        "{BALLOT_SELECT} WHERE room_id = ? AND voter_id = ? ORDER BY updated_at DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Ballot>(&sql)
        .bind(room_id)
        .bind(voter_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
