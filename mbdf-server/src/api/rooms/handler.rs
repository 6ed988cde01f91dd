//! Rooms API handlers
//!
//! Thin glue over the repositories and the lifecycle guard. Role checks for
//! archival live in the guard itself; membership management checks here.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{access_request, agreement, membership, room};
use crate::lifecycle::{self, ArchiveOutcome, ArchivePrecheck, UnarchiveOutcome};
use crate::utils::{AppError, AppResult};
use shared::models::{AccessRequest, Agreement, Membership, MembershipCreate, Room, RoomCreate};

#[derive(Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub substance_identifier: Option<String>,
}

/// POST /rooms — the creator becomes the room admin
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateRoomRequest>,
) -> AppResult<Json<Room>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = room::create(
        &state.pool,
        RoomCreate {
            name: payload.name,
            substance_identifier: payload.substance_identifier,
        },
        user.id,
    )
    .await?;
    tracing::info!(room_id = created.id, creator = user.id, "room created");
    Ok(Json(created))
}

/// GET /rooms/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Room>> {
    let found = room::get(&state.pool, id).await?;
    Ok(Json(found))
}

#[derive(Serialize)]
pub struct MemberList {
    pub items: Vec<Membership>,
}

/// GET /rooms/{id}/members
pub async fn list_members(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberList>> {
    room::get(&state.pool, id).await?;
    let items = membership::list_by_room(&state.pool, id).await?;
    Ok(Json(MemberList { items }))
}

/// POST /rooms/{id}/members — admin or LR adds a member
pub async fn add_member(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<MembershipCreate>,
) -> AppResult<Json<Membership>> {
    let found = room::get(&state.pool, id).await?;
    if found.is_archived() {
        return Err(AppError::validation("Room is archived"));
    }

    let role = membership::role_of(&state.pool, id, user.id).await?;
    if !role.can_manage_requests() {
        return Err(AppError::forbidden(
            "Only the room admin or Lead Registrant can add members",
        ));
    }

    let added = membership::add(&state.pool, id, payload.user_id, payload.role).await?;
    Ok(Json(added))
}

/// GET /rooms/{id}/archive/check — read-only archival precheck
pub async fn archive_check(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ArchivePrecheck>> {
    let check = lifecycle::precheck_archive(&state.pool, id).await?;
    Ok(Json(check))
}

#[derive(Deserialize, Default)]
pub struct ArchiveConfirmRequest {
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ArchiveConfirmResponse {
    pub success: bool,
    pub room_id: i64,
    pub room_name: String,
    pub archived_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<String>,
    pub pending_requests_rejected: i64,
    pub approved_requests_revoked: i64,
}

impl From<ArchiveOutcome> for ArchiveConfirmResponse {
    fn from(outcome: ArchiveOutcome) -> Self {
        Self {
            success: true,
            room_id: outcome.room_id,
            room_name: outcome.room_name,
            archived_at: outcome.archived_at,
            archive_reason: outcome.archive_reason,
            pending_requests_rejected: outcome.rejected_requests,
            approved_requests_revoked: outcome.revoked_requests,
        }
    }
}

/// POST /rooms/{id}/archive/confirm
pub async fn archive_confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ArchiveConfirmRequest>,
) -> AppResult<Json<ArchiveConfirmResponse>> {
    let outcome =
        lifecycle::confirm_archive(&state.pool, id, user.id, payload.reason.as_deref()).await?;
    Ok(Json(outcome.into()))
}

#[derive(Serialize)]
pub struct UnarchiveResponse {
    pub success: bool,
    pub room_id: i64,
    pub room_name: String,
    pub unarchived_at: i64,
}

impl From<UnarchiveOutcome> for UnarchiveResponse {
    fn from(outcome: UnarchiveOutcome) -> Self {
        Self {
            success: true,
            room_id: outcome.room_id,
            room_name: outcome.room_name,
            unarchived_at: outcome.unarchived_at,
        }
    }
}

/// POST /rooms/{id}/unarchive — admin only
pub async fn unarchive(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UnarchiveResponse>> {
    let outcome = lifecycle::confirm_unarchive(&state.pool, id, user.id).await?;
    Ok(Json(outcome.into()))
}

#[derive(Serialize)]
pub struct AccessRequestList {
    pub items: Vec<AccessRequest>,
}

/// GET /rooms/{id}/access-requests — admin or LR reviews the queue
pub async fn list_access_requests(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AccessRequestList>> {
    room::get(&state.pool, id).await?;

    let role = membership::role_of(&state.pool, id, user.id).await?;
    if !role.can_manage_requests() {
        return Err(AppError::forbidden(
            "Only the room admin or Lead Registrant can review access requests",
        ));
    }

    let items = access_request::list_by_room(&state.pool, id).await?;
    Ok(Json(AccessRequestList { items }))
}

/// POST /rooms/{id}/access-requests — file a pending request for the caller
pub async fn create_access_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AccessRequest>> {
    let found = room::get(&state.pool, id).await?;
    if found.is_archived() {
        return Err(AppError::validation("Room is archived"));
    }
    let created = access_request::create(&state.pool, id, user.id).await?;
    Ok(Json(created))
}

/// POST /rooms/{id}/access-requests/{req_id}/approve — admin or LR
pub async fn approve_access_request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, req_id)): Path<(i64, i64)>,
) -> AppResult<Json<AccessRequest>> {
    room::get(&state.pool, id).await?;

    let role = membership::role_of(&state.pool, id, user.id).await?;
    if !role.can_manage_requests() {
        return Err(AppError::forbidden(
            "Only the room admin or Lead Registrant can approve access requests",
        ));
    }

    let request = access_request::find_by_id(&state.pool, req_id)
        .await?
        .filter(|r| r.room_id == id)
        .ok_or_else(|| AppError::not_found(format!("Access request {req_id} not found")))?;

    let approved = access_request::approve(&state.pool, request.id).await?;
    Ok(Json(approved))
}

#[derive(Deserialize, Validate)]
pub struct CreateAgreementRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
}

#[derive(Serialize)]
pub struct AgreementList {
    pub items: Vec<Agreement>,
}

/// GET /rooms/{id}/agreements
pub async fn list_agreements(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AgreementList>> {
    room::get(&state.pool, id).await?;
    let items = agreement::list_by_room(&state.pool, id).await?;
    Ok(Json(AgreementList { items }))
}

/// POST /rooms/{id}/agreements — draft a new agreement
pub async fn create_agreement(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CreateAgreementRequest>,
) -> AppResult<Json<Agreement>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let found = room::get(&state.pool, id).await?;
    if found.is_archived() {
        return Err(AppError::validation("Room is archived"));
    }
    membership::role_of(&state.pool, id, user.id).await?;

    let created = agreement::create(&state.pool, id, &payload.title).await?;
    Ok(Json(created))
}
