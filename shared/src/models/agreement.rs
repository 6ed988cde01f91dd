//! Agreement Model
//!
//! E-signature bookkeeping for room agreements. Only the draft count matters
//! to the archival precheck; signing flows live outside this service.

use serde::{Deserialize, Serialize};

/// Agreement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Draft,
    Signed,
}

/// Agreement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Agreement {
    pub id: i64,
    pub room_id: i64,
    pub title: String,
    pub status: AgreementStatus,
    pub created_at: i64,
}
