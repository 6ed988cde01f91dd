//! Shared types for the MBDF room service
//!
//! Domain models and utility types used by the server crate and its tests.
//! DB row types derive `sqlx::FromRow` behind the `db` feature so UI-facing
//! consumers can use the models without pulling in the database stack.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
