//! Room Lifecycle Guard
//!
//! Archival is destructive for collaboration state (pending access requests
//! are rejected, approved ones revoked), so it is split into a read-only
//! precheck the client shows to the operator and a single-transaction confirm
//! that applies the whole cascade or none of it.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::repository::{access_request, agreement, candidate, membership, room};
use crate::utils::{AppError, AppResult};
use shared::models::{AccessRequestStatus, RoomStatus};

/// Minimum length for an archive reason, when one is supplied
const MIN_REASON_LEN: usize = 10;

/// What archival will do to the room's collaboration state
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArchiveEffects {
    pub pending_will_be_rejected: i64,
    pub approved_will_be_revoked: i64,
    pub votes_will_be_closed: i64,
}

/// Read-only archival precheck, rendered to the operator before confirm
#[derive(Debug, Serialize)]
pub struct ArchivePrecheck {
    pub room_id: i64,
    pub room_name: String,
    pub status: RoomStatus,
    pub member_count: i64,
    pub pending_request_count: i64,
    pub approved_request_count: i64,
    pub open_vote_count: i64,
    pub draft_agreement_count: i64,
    pub effects: ArchiveEffects,
    pub can_archive: bool,
    pub reasons: Vec<String>,
}

/// Counts of what the archival transaction actually changed
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub room_id: i64,
    pub room_name: String,
    pub archived_at: i64,
    pub archive_reason: Option<String>,
    pub rejected_requests: i64,
    pub revoked_requests: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnarchiveOutcome {
    pub room_id: i64,
    pub room_name: String,
    pub unarchived_at: i64,
    pub status: RoomStatus,
}

/// Gather everything archival would touch. Pure read, safe to call
/// repeatedly; the confirm step re-checks its own preconditions.
pub async fn precheck_archive(pool: &SqlitePool, room_id: i64) -> AppResult<ArchivePrecheck> {
    let room = room::get(pool, room_id).await?;

    let member_count = membership::count_by_room(pool, room_id).await?;
    let pending =
        access_request::count_by_status(pool, room_id, AccessRequestStatus::Pending).await?;
    let approved =
        access_request::count_by_status(pool, room_id, AccessRequestStatus::Approved).await?;
    let drafts = agreement::count_drafts(pool, room_id).await?;

    // At most one vote per room; it counts as open while candidates exist
    // and none has been selected.
    let candidate_count = candidate::count_by_room(pool, room_id).await?;
    let has_selected = candidate::find_selected(pool, room_id).await?.is_some();
    let open_votes = i64::from(candidate_count > 0 && !has_selected);

    let mut reasons = Vec::new();
    if room.is_archived() {
        reasons.push("Room is already archived".to_string());
    }

    Ok(ArchivePrecheck {
        room_id,
        room_name: room.name,
        status: room.status,
        member_count,
        pending_request_count: pending,
        approved_request_count: approved,
        open_vote_count: open_votes,
        draft_agreement_count: drafts,
        effects: ArchiveEffects {
            pending_will_be_rejected: pending,
            approved_will_be_revoked: approved,
            votes_will_be_closed: open_votes,
        },
        can_archive: reasons.is_empty(),
        reasons,
    })
}

/// Archive the room and cascade over its access requests in one transaction.
///
/// Callable by the room admin or the LR. An open vote is not force-settled;
/// the archived status blocks further ballots, and unarchiving reopens the
/// vote where it stood.
pub async fn confirm_archive(
    pool: &SqlitePool,
    room_id: i64,
    caller_id: i64,
    reason: Option<&str>,
) -> AppResult<ArchiveOutcome> {
    let room = room::get(pool, room_id).await?;

    let role = membership::role_of(pool, room_id, caller_id).await?;
    if !role.can_archive() {
        return Err(AppError::forbidden(
            "Only the room admin or Lead Registrant can archive a room",
        ));
    }

    if room.is_archived() {
        return Err(AppError::conflict(format!("Room {room_id} is already archived")));
    }

    let reason = match reason.map(str::trim) {
        Some(r) if r.len() < MIN_REASON_LEN => {
            return Err(AppError::validation(format!(
                "Archive reason must be at least {MIN_REASON_LEN} characters"
            )));
        }
        Some(r) => Some(r.to_string()),
        None => None,
    };

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Status guard inside the transaction: two racing confirms resolve to
    // one archival and one conflict.
    let updated = sqlx::query(
        "UPDATE room SET status = 'archived', archived_at = ?1, archive_reason = ?2, \
         updated_at = ?1 WHERE id = ?3 AND status != 'archived'",
    )
    .bind(now)
    .bind(&reason)
    .bind(room_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::conflict(format!("Room {room_id} is already archived")));
    }

    let rejected = sqlx::query(
        "UPDATE access_request SET status = 'rejected', resolved_at = ?1 \
         WHERE room_id = ?2 AND status = 'pending'",
    )
    .bind(now)
    .bind(room_id)
    .execute(&mut *tx)
    .await?
    .rows_affected() as i64;

    let revoked = sqlx::query(
        "UPDATE access_request SET status = 'revoked', resolved_at = ?1 \
         WHERE room_id = ?2 AND status = 'approved'",
    )
    .bind(now)
    .bind(room_id)
    .execute(&mut *tx)
    .await?
    .rows_affected() as i64;

    tx.commit().await?;

    tracing::info!(
        room_id,
        caller_id,
        rejected,
        revoked,
        "room archived, access requests cascaded"
    );

    Ok(ArchiveOutcome {
        room_id,
        room_name: room.name,
        archived_at: now,
        archive_reason: reason,
        rejected_requests: rejected,
        revoked_requests: revoked,
    })
}

/// Reopen an archived room. Admin only; revoked access requests stay revoked
/// (affected users must re-request access).
pub async fn confirm_unarchive(
    pool: &SqlitePool,
    room_id: i64,
    caller_id: i64,
) -> AppResult<UnarchiveOutcome> {
    let room = room::get(pool, room_id).await?;

    let role = membership::role_of(pool, room_id, caller_id).await?;
    if !role.can_unarchive() {
        return Err(AppError::forbidden("Only the room admin can unarchive a room"));
    }

    if !room.is_archived() {
        return Err(AppError::conflict(format!("Room {room_id} is not archived")));
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE room SET status = 'active', archived_at = NULL, archive_reason = NULL, \
         updated_at = ?1 WHERE id = ?2 AND status = 'archived'",
    )
    .bind(now)
    .bind(room_id)
    .execute(pool)
    .await?;

    tracing::info!(room_id, caller_id, "room unarchived");

    Ok(UnarchiveOutcome {
        room_id,
        room_name: room.name,
        unarchived_at: now,
        status: RoomStatus::Active,
    })
}
