//! Membership Model
//!
//! One row per (room, user). The role is per-room: the same user can be an
//! admin in one room and a plain member in another, so role never lives in
//! the auth token.

use serde::{Deserialize, Serialize};

/// Per-room role
///
/// Capabilities are expressed as methods instead of string comparisons at
/// call sites, so every role-gated action reads as a single capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    /// Room administrator
    Admin,
    /// Confirmed Lead Registrant
    Lr,
    /// Regular member
    Member,
}

impl RoomRole {
    /// Members may only nominate themselves; admins and the LR may nominate
    /// any other member.
    pub fn can_nominate_others(self) -> bool {
        matches!(self, RoomRole::Admin | RoomRole::Lr)
    }

    /// Archival may be requested by the room admin or the LR.
    pub fn can_archive(self) -> bool {
        matches!(self, RoomRole::Admin | RoomRole::Lr)
    }

    /// Unarchival is stricter: admin only.
    pub fn can_unarchive(self) -> bool {
        matches!(self, RoomRole::Admin)
    }

    pub fn can_manage_requests(self) -> bool {
        matches!(self, RoomRole::Admin | RoomRole::Lr)
    }
}

/// Membership entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Membership {
    pub room_id: i64,
    pub user_id: i64,
    pub role: RoomRole,
    pub created_at: i64,
}

/// Add member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipCreate {
    pub user_id: i64,
    #[serde(default = "default_member_role")]
    pub role: RoomRole,
}

fn default_member_role() -> RoomRole {
    RoomRole::Member
}
