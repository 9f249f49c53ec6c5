/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ConsoleConfig,
    db,
    error::ConsoleResult,
    session::SessionManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ConsoleConfig>,
    pub console_db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub session_manager: Arc<SessionManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ConsoleConfig) -> ConsoleResult<Self> {
        config.validate()?;

        let console_db =
            db::create_pool(&config.storage.console_db, db::DatabaseOptions::default()).await?;

        db::run_migrations(&console_db).await?;
        db::test_connection(&console_db).await?;

        let config = Arc::new(config);
        let account_manager = Arc::new(AccountManager::new(console_db.clone()));
        let session_manager = Arc::new(SessionManager::new(
            console_db.clone(),
            Arc::new(config.authentication.clone()),
        ));

        Ok(Self {
            config,
            console_db,
            account_manager,
            session_manager,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
