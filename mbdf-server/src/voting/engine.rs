//! Voting Engine
//!
//! Accepts ballots, recomputes standings after every write, and triggers
//! finalization server-side in the same request that records the completing
//! ballot. Finalization is a conditional write, so concurrent completion
//! triggers settle to exactly one selected candidate per room.

use sqlx::SqlitePool;

use crate::db::repository::{ballot, candidate, membership, room};
use crate::utils::{AppError, AppResult};
use crate::voting::scoring::{
    self, VoteDecision, VoteProgress, eligible_voter_count, tally_ballots,
};
use serde::Serialize;
use shared::models::{Ballot, BallotScores, Candidate, CandidateResult, Room, RoomRole, RoomStatus};

/// Outcome of a ballot submission, reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotOutcome {
    /// More ballots are still expected
    Pending,
    /// All ballots are in but the leaders are exactly tied; voting stays
    /// open for differentiated re-submission
    RevoteRequired,
    /// The vote finalized; this candidate is the Lead Registrant
    Finalized { selected_candidate_id: i64 },
}

/// Everything the votes view needs in one read
#[derive(Debug, Serialize)]
pub struct VoteState {
    pub results: Vec<CandidateResult>,
    pub my_vote: Option<Ballot>,
    pub is_finalized: bool,
}

/// Submit or overwrite one voter's ballot for one candidate.
///
/// Completion is re-evaluated after every successful write; this is what
/// makes auto-finalization fire without any client follow-up call.
pub async fn submit_ballot(
    pool: &SqlitePool,
    room_id: i64,
    voter_id: i64,
    candidate_id: i64,
    scores: &BallotScores,
) -> AppResult<BallotOutcome> {
    let room = room::get(pool, room_id).await?;
    check_voting_open(pool, &room).await?;
    check_voter_eligible(pool, room_id, voter_id).await?;
    check_scores(scores)?;

    let target = candidate::find_by_id(pool, candidate_id)
        .await?
        .filter(|c| c.room_id == room_id)
        .ok_or_else(|| {
            AppError::not_found(format!("Candidate {candidate_id} not found in room {room_id}"))
        })?;

    // The upsert re-checks room status inside the statement, so an archival
    // committing after check_voting_open cannot slip a ballot through.
    if !ballot::upsert(pool, room_id, voter_id, target.id, scores).await? {
        return Err(AppError::validation("Room is archived, voting is closed"));
    }
    tracing::debug!(room_id, voter_id, candidate_id, "ballot recorded");

    evaluate_completion(pool, room_id).await
}

/// Apply one voter's ballots for several candidates as a single all-or-nothing
/// batch, then evaluate completion once.
pub async fn submit_all_ballots(
    pool: &SqlitePool,
    room_id: i64,
    voter_id: i64,
    entries: &[(i64, BallotScores)],
) -> AppResult<BallotOutcome> {
    if entries.is_empty() {
        return Err(AppError::validation("Ballot batch is empty"));
    }

    let room = room::get(pool, room_id).await?;
    check_voting_open(pool, &room).await?;
    check_voter_eligible(pool, room_id, voter_id).await?;

    // Validate the whole batch before persisting anything.
    let candidates = candidate::list_by_room(pool, room_id).await?;
    for (candidate_id, scores) in entries {
        if !candidates.iter().any(|c| c.id == *candidate_id) {
            return Err(AppError::not_found(format!(
                "Candidate {candidate_id} not found in room {room_id}"
            )));
        }
        check_scores(scores)?;
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for (candidate_id, scores) in entries {
        let result = sqlx::query(ballot::BALLOT_UPSERT)
            .bind(room_id)
            .bind(voter_id)
            .bind(candidate_id)
            .bind(scores.technical_score)
            .bind(scores.experience_score)
            .bind(scores.availability_score)
            .bind(scores.communication_score)
            .bind(scores.leadership_score)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        // Status guard tripped: the room was archived under us. Dropping the
        // transaction rolls the whole batch back.
        if result.rows_affected() == 0 {
            return Err(AppError::validation("Room is archived, voting is closed"));
        }
    }
    tx.commit().await?;
    tracing::debug!(room_id, voter_id, count = entries.len(), "ballot batch recorded");

    evaluate_completion(pool, room_id).await
}

/// Current standings: one entry per candidate, score descending.
/// Pure read, no side effects.
pub async fn compute_results(pool: &SqlitePool, room_id: i64) -> AppResult<Vec<CandidateResult>> {
    room::get(pool, room_id).await?;
    let candidates = candidate::list_by_room(pool, room_id).await?;
    let ballots = ballot::list_by_room(pool, room_id).await?;
    Ok(scoring::to_results(&tally_ballots(&candidates, &ballots)))
}

/// The votes view: standings, the caller's latest ballot, finalization flag
pub async fn fetch_vote_state(
    pool: &SqlitePool,
    room_id: i64,
    voter_id: i64,
) -> AppResult<VoteState> {
    let room = room::get(pool, room_id).await?;
    let results = compute_results(pool, room_id).await?;
    let my_vote = ballot::find_latest_by_voter(pool, room_id, voter_id).await?;
    let is_finalized = is_finalized(pool, &room).await?;
    Ok(VoteState {
        results,
        my_vote,
        is_finalized,
    })
}

/// Nominate a member as LR candidate.
///
/// Members may only nominate themselves; admins and the LR may nominate any
/// other member. Caller identity and room are explicit parameters — there is
/// no ambient user context in the core.
pub async fn nominate_candidate(
    pool: &SqlitePool,
    room_id: i64,
    nominator_id: i64,
    target_user_id: i64,
) -> AppResult<Candidate> {
    let room = room::get(pool, room_id).await?;
    if room.is_archived() {
        return Err(AppError::validation("Room is archived"));
    }
    if is_finalized(pool, &room).await? {
        return Err(AppError::conflict("Voting is already finalized"));
    }

    let nominator_role = membership::role_of(pool, room_id, nominator_id).await?;
    if target_user_id != nominator_id && !nominator_role.can_nominate_others() {
        return Err(AppError::forbidden(
            "Members may only nominate themselves as LR candidate",
        ));
    }

    let target_role = membership::role_of(pool, room_id, target_user_id)
        .await
        .map_err(|_| {
            AppError::not_found(format!(
                "User {target_user_id} is not a member of room {room_id}"
            ))
        })?;
    if target_role == RoomRole::Lr {
        return Err(AppError::business_rule(
            "User already holds the Lead Registrant role",
        ));
    }

    if candidate::find_by_user(pool, room_id, target_user_id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(format!(
            "User {target_user_id} is already nominated in room {room_id}"
        )));
    }

    let created = candidate::create(pool, room_id, target_user_id).await?;
    tracing::info!(room_id, user_id = target_user_id, "LR candidate nominated");
    Ok(created)
}

/// Mark the winning candidate as selected and promote them to LR.
///
/// The update is conditional on no candidate in the room being selected yet,
/// so racing completion triggers resolve to one winner: the losing call sees
/// zero affected rows and degrades to an idempotent no-op (same candidate)
/// or a conflict (different candidate).
pub async fn finalize_selection(
    pool: &SqlitePool,
    room_id: i64,
    candidate_id: i64,
) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE candidate SET is_selected = 1 \
         WHERE id = ?1 AND room_id = ?2 \
         AND (SELECT status FROM room WHERE id = ?2) != 'archived' \
         AND NOT EXISTS (SELECT 1 FROM candidate WHERE room_id = ?2 AND is_selected = 1)",
    )
    .bind(candidate_id)
    .bind(room_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        let selected: Option<i64> =
            sqlx::query_scalar("SELECT id FROM candidate WHERE room_id = ? AND is_selected = 1")
                .bind(room_id)
                .fetch_optional(&mut *tx)
                .await?;
        return match selected {
            // A concurrent trigger already selected the same candidate.
            Some(id) if id == candidate_id => {
                tx.commit().await?;
                Ok(())
            }
            Some(other) => Err(AppError::conflict(format!(
                "Candidate {other} is already selected in room {room_id}"
            ))),
            None => {
                let status: Option<String> =
                    sqlx::query_scalar("SELECT status FROM room WHERE id = ?")
                        .bind(room_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if status.as_deref() == Some("archived") {
                    Err(AppError::validation("Room is archived, voting is closed"))
                } else {
                    Err(AppError::not_found(format!(
                        "Candidate {candidate_id} not found in room {room_id}"
                    )))
                }
            }
        };
    }

    sqlx::query(
        "UPDATE membership SET role = 'lr' WHERE room_id = ?1 \
         AND user_id = (SELECT user_id FROM candidate WHERE id = ?2)",
    )
    .bind(room_id)
    .bind(candidate_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(room_id, candidate_id, "Lead Registrant selected, vote finalized");
    Ok(())
}

/// Re-evaluate completion for a room. Called after every ballot write.
async fn evaluate_completion(pool: &SqlitePool, room_id: i64) -> AppResult<BallotOutcome> {
    let candidates = candidate::list_by_room(pool, room_id).await?;

    if let Some(selected) = candidates.iter().find(|c| c.is_selected) {
        return Ok(BallotOutcome::Finalized {
            selected_candidate_id: selected.id,
        });
    }

    let members = membership::list_by_room(pool, room_id).await?;
    let ballots = ballot::list_by_room(pool, room_id).await?;
    let progress = VoteProgress {
        eligible_voters: eligible_voter_count(&members, &candidates),
        candidate_count: candidates.len() as i64,
        actual_ballots: ballots.len() as i64,
    };
    let tallies = tally_ballots(&candidates, &ballots);

    match scoring::decide(&tallies, &progress) {
        VoteDecision::Pending => Ok(BallotOutcome::Pending),
        VoteDecision::RevoteRequired(top) => {
            tracing::info!(room_id, tied = ?top, "vote complete but tied, re-evaluation required");
            Ok(BallotOutcome::RevoteRequired)
        }
        VoteDecision::Winner(winner_id) => {
            // A finalize failure must stay observable: the vote would be
            // complete-but-unfinalized, recoverable by the next submission
            // or an admin retry.
            finalize_selection(pool, room_id, winner_id)
                .await
                .map_err(|e| {
                    tracing::error!(room_id, winner_id, error = %e,
                        "vote complete but finalization failed");
                    AppError::internal(format!(
                        "Vote is complete but finalization failed: {e}"
                    ))
                })?;
            Ok(BallotOutcome::Finalized {
                selected_candidate_id: winner_id,
            })
        }
    }
}

/// Finalized = room closed, or some candidate carries the selected flag
pub async fn is_finalized(pool: &SqlitePool, room: &Room) -> AppResult<bool> {
    if room.status == RoomStatus::Closed {
        return Ok(true);
    }
    Ok(candidate::find_selected(pool, room.id).await?.is_some())
}

async fn check_voting_open(pool: &SqlitePool, room: &Room) -> AppResult<()> {
    if room.is_archived() {
        return Err(AppError::validation("Room is archived, voting is closed"));
    }
    if is_finalized(pool, room).await? {
        return Err(AppError::validation("Voting is already finalized"));
    }
    Ok(())
}

async fn check_voter_eligible(pool: &SqlitePool, room_id: i64, voter_id: i64) -> AppResult<()> {
    let member = membership::find(pool, room_id, voter_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("User {voter_id} is not a member of room {room_id}"))
        })?;

    // The sitting LR is outside the electorate; a ballot from them would
    // inflate the count past the expected total and trip completion early.
    if member.role == RoomRole::Lr {
        return Err(AppError::validation(
            "The sitting Lead Registrant does not take part in the vote",
        ));
    }

    if candidate::find_by_user(pool, room_id, voter_id)
        .await?
        .is_some()
    {
        return Err(AppError::validation(
            "Candidates are evaluated, not evaluators: nominated members cannot vote",
        ));
    }
    Ok(())
}

fn check_scores(scores: &BallotScores) -> AppResult<()> {
    scores.half_point_sum().map(|_| ()).ok_or_else(|| {
        AppError::validation("Scores must be between 0 and 5 in half-point steps")
    })
}
