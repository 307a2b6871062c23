//! Application context and dependency injection
use crate::{
    account::AccountManager, config::ServerConfig, db, error::FareboxResult,
    ledger::TransactionManager, media::MediaManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services. The pool is the single
/// injected storage handle; every manager receives it explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub media: Arc<MediaManager>,
    pub transactions: Arc<TransactionManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> FareboxResult<Self> {
        config.validate()?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;

        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let accounts = Arc::new(AccountManager::new(db.clone()));
        let media = Arc::new(MediaManager::new(db.clone()));
        let transactions = Arc::new(TransactionManager::new(db.clone()));

        Ok(Self {
            config: Arc::new(config),
            db,
            accounts,
            media,
            transactions,
        })
    }
}
