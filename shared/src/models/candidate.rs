//! Candidate Model

use serde::{Deserialize, Serialize};

/// Lead-Registrant candidate — a member nominated for the LR seat.
///
/// At most one candidate per room may have `is_selected = true`; that flag is
/// the durable marker that the room's vote is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Candidate {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub is_selected: bool,
    pub created_at: i64,
}

/// Nominate candidate payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateCreate {
    pub room_id: i64,
    pub user_id: i64,
}
