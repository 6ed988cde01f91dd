//! Room Model

use serde::{Deserialize, Serialize};

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Open for membership, ballots and nominations
    Active,
    /// Voting concluded; room still readable/writable for other features
    Closed,
    /// Read-only; set by the lifecycle guard, reversible by an admin
    Archived,
}

impl Default for RoomStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Room entity — one MBDF substance workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Room {
    pub id: i64,
    pub name: String,
    /// CAS/EC number the registration workspace is organised around
    pub substance_identifier: Option<String>,
    pub status: RoomStatus,
    /// Set when status flips to archived, cleared on unarchive
    pub archived_at: Option<i64>,
    pub archive_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Room {
    pub fn is_archived(&self) -> bool {
        self.status == RoomStatus::Archived
    }
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub name: String,
    pub substance_identifier: Option<String>,
}
