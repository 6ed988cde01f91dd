//! Data models
//!
//! Shared between mbdf-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod access_request;
pub mod agreement;
pub mod ballot;
pub mod candidate;
pub mod membership;
pub mod room;

// Re-exports
pub use access_request::*;
pub use agreement::*;
pub use ballot::*;
pub use candidate::*;
pub use membership::*;
pub use room::*;
