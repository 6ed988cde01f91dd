use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// Shared server state
///
/// Cloned into every handler; `Arc` keeps the clone shallow.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Open the database under the configured working directory and build
    /// the full state.
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.db_path()).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config,
            pool: db.pool,
            jwt_service,
        })
    }

    /// State over an in-memory database (tests)
    pub async fn in_memory() -> Result<Self, AppError> {
        let db = DbService::in_memory().await?;
        Ok(Self {
            config: Config::from_env(),
            pool: db.pool,
            jwt_service: Arc::new(JwtService::default()),
        })
    }
}
