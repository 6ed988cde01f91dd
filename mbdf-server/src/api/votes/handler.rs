//! Votes API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::voting::engine::{self, BallotOutcome, VoteState};
use shared::models::BallotScores;

#[derive(Deserialize)]
pub struct SubmitVoteRequest {
    pub room_id: i64,
    pub candidate_id: i64,
    #[serde(flatten)]
    pub scores: BallotScores,
}

#[derive(Deserialize)]
pub struct BatchEntry {
    pub candidate_id: i64,
    #[serde(flatten)]
    pub scores: BallotScores,
}

#[derive(Deserialize)]
pub struct SubmitBatchRequest {
    pub room_id: i64,
    pub ballots: Vec<BatchEntry>,
}

/// Submission response. `status` tells the client whether voting is still
/// open, tied (re-evaluation required) or finalized.
#[derive(Serialize)]
pub struct SubmitVoteResponse {
    pub success: bool,
    pub status: VoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_candidate_id: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    Pending,
    RevoteRequired,
    Finalized,
}

impl From<BallotOutcome> for SubmitVoteResponse {
    fn from(outcome: BallotOutcome) -> Self {
        match outcome {
            BallotOutcome::Pending => Self {
                success: true,
                status: VoteStatus::Pending,
                selected_candidate_id: None,
            },
            BallotOutcome::RevoteRequired => Self {
                success: true,
                status: VoteStatus::RevoteRequired,
                selected_candidate_id: None,
            },
            BallotOutcome::Finalized {
                selected_candidate_id,
            } => Self {
                success: true,
                status: VoteStatus::Finalized,
                selected_candidate_id: Some(selected_candidate_id),
            },
        }
    }
}

/// POST /votes — submit or overwrite one ballot
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SubmitVoteRequest>,
) -> AppResult<Json<SubmitVoteResponse>> {
    let outcome = engine::submit_ballot(
        &state.pool,
        payload.room_id,
        user.id,
        payload.candidate_id,
        &payload.scores,
    )
    .await?;
    Ok(Json(outcome.into()))
}

/// POST /votes/batch — all-or-nothing ballots for several candidates
pub async fn submit_batch(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SubmitBatchRequest>,
) -> AppResult<Json<SubmitVoteResponse>> {
    let entries: Vec<(i64, BallotScores)> = payload
        .ballots
        .into_iter()
        .map(|b| (b.candidate_id, b.scores))
        .collect();
    let outcome =
        engine::submit_all_ballots(&state.pool, payload.room_id, user.id, &entries).await?;
    Ok(Json(outcome.into()))
}

#[derive(Deserialize)]
pub struct VotesQuery {
    #[serde(alias = "roomId")]
    pub room_id: i64,
}

/// GET /votes?roomId=… — standings plus the caller's latest ballot
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<VotesQuery>,
) -> AppResult<Json<VoteState>> {
    let view = engine::fetch_vote_state(&state.pool, query.room_id, user.id).await?;
    Ok(Json(view))
}
