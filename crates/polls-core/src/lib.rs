pub mod admin;
pub mod error;
pub mod polls;

use admin::AdminSite;
use polls_db::DbPool;

/// Number of questions the index page shows unless configured otherwise.
pub const DEFAULT_LATEST_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub latest_limit: i64,
    /// Mount the `/admin` routes.
    pub admin_enabled: bool,
    pub admin_site: AdminSite,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            latest_limit: DEFAULT_LATEST_LIMIT,
            admin_enabled: true,
            admin_site: AdminSite::default(),
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = polls_db::create_pool("sqlite::memory:", 1).await.unwrap();
    polls_db::run_migrations(&pool).await.unwrap();
    pool
}
