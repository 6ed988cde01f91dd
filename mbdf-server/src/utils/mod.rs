//! Utilities — shared helper types and functions
//!
//! - [`AppError`] — application error type
//! - [`AppResult`] — common result alias
//! - logger setup

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, ErrorBody};
pub use result::AppResult;
