//! Candidates API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::candidate;
use crate::utils::AppResult;
use crate::voting::engine;
use shared::models::{Candidate, CandidateCreate};

#[derive(Deserialize)]
pub struct CandidatesQuery {
    #[serde(alias = "roomId")]
    pub room_id: i64,
}

#[derive(Serialize)]
pub struct CandidateList {
    pub items: Vec<Candidate>,
}

/// GET /candidates?roomId=…
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CandidatesQuery>,
) -> AppResult<Json<CandidateList>> {
    let items = candidate::list_by_room(&state.pool, query.room_id).await?;
    Ok(Json(CandidateList { items }))
}

/// POST /candidates — nominate a member as LR candidate
///
/// Members self-nominate; admins and the LR may nominate any other member.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CandidateCreate>,
) -> AppResult<Json<Candidate>> {
    let created =
        engine::nominate_candidate(&state.pool, payload.room_id, user.id, payload.user_id).await?;
    Ok(Json(created))
}
