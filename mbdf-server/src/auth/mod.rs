//! Authentication module
//!
//! - [`JwtService`] — HS256 token service
//! - [`CurrentUser`] — authenticated caller context
//! - [`require_auth`] — authentication middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
