//! Result type alias for application operations

use super::AppError;

/// Result type used by core operations and HTTP handlers
pub type AppResult<T> = Result<T, AppError>;
