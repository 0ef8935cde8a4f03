//! # attachhub-database
//!
//! SQLite connection management, embedded migrations, and concrete
//! repository implementations for all AttachHub entities.
//!
//! Repositories read through the pool they were built with. Writes take an
//! explicit `&mut SqliteConnection` so that callers decide the transaction
//! boundary.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

#[cfg(test)]
pub(crate) mod testing {
    use attachhub_core::config::DatabaseConfig;

    use crate::connection::DatabasePool;
    use crate::migration::run_migrations;

    /// A migrated database in a temporary directory.
    pub async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("test.db").display()),
            ..DatabaseConfig::default()
        };
        let db = DatabasePool::connect(&config).await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        (dir, db)
    }
}
