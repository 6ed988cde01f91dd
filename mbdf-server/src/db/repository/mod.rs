//! Repository Module
//!
//! CRUD operations per table, as free functions over `&SqlitePool`.
//! Multi-table transactions (finalization, archival) live with the services
//! that own them; repositories cover the single-statement paths.

pub mod access_request;
pub mod agreement;
pub mod ballot;
pub mod candidate;
pub mod membership;
pub mod room;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
