//! Access Request Model
//!
//! Outsiders request access to a room; admins/LR approve. Archival rejects
//! all pending requests and revokes all approved ones in one transaction.

use serde::{Deserialize, Serialize};

/// Access request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AccessRequestStatus {
    Pending,
    Approved,
    Rejected,
    /// Previously approved, invalidated by room archival
    Revoked,
}

/// Access request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AccessRequest {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub status: AccessRequestStatus,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}
