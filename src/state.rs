use std::sync::Arc;

use crate::auth::{jwt::JwtKeys, repo::PgUserRepo, repo::UserRepo};
use crate::config::AppConfig;
use crate::db;
use crate::listings::repo::{ListingRepo, PgListingRepo};
use crate::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub listings: Arc<dyn ListingRepo>,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        Ok(Self::from_parts(
            Arc::new(PgUserRepo::new(pool.clone())),
            Arc::new(PgListingRepo::new(pool)),
            config,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        listings: Arc<dyn ListingRepo>,
        config: AppConfig,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt);
        Self {
            users,
            listings,
            config: Arc::new(config),
            jwt,
        }
    }

    /// State backed by [`MemoryStore`], for tests and local runs.
    pub fn in_memory() -> Self {
        Self::in_memory_with(AppConfig::local("test-secret"))
    }

    pub fn in_memory_with(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(store.clone(), store, config)
    }
}
