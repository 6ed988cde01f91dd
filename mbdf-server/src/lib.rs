//! MBDF Room Server
//!
//! Backend for multi-tenant regulatory-collaboration workspaces ("MBDF/KKDİK
//! rooms"). The core subsystems:
//!
//! - **Voting** (`voting`): Lead-Registrant nomination, multi-criterion
//!   ballots, mean-score aggregation, completion and tie detection, race-safe
//!   server-side finalization.
//! - **Lifecycle** (`lifecycle`): archival precheck, atomic archival cascade
//!   over access requests, admin-only unarchival.
//!
//! # Module layout
//!
//! ```text
//! mbdf-server/src/
//! ├── core/        # config, state, HTTP server
//! ├── auth/        # JWT authentication
//! ├── api/         # routes and handlers
//! ├── voting/      # scoring + engine
//! ├── lifecycle/   # archival guard
//! ├── db/          # pool, migrations, repositories
//! └── utils/       # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod lifecycle;
pub mod utils;
pub mod voting;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, create the working directory and initialize logging.
///
/// Called once at startup, before config-dependent services spin up.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_to_file = std::env::var("LOG_TO_FILE")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);
    let log_level = std::env::var("LOG_LEVEL").ok();

    if log_to_file {
        let log_dir = format!("{work_dir}/logs");
        std::fs::create_dir_all(&log_dir)?;
        init_logger_with_file(log_level.as_deref(), Some(&log_dir));
    } else {
        init_logger_with_file(log_level.as_deref(), None);
    }

    Ok(())
}
