//! Database operations for the permit SQLite file.
//!
//! ## Tables
//!
//! - `users` - Member accounts and renewal flags
//! - `tower_sessions` - Session storage, created by the session store
//!
//! # Migrations
//!
//! Stored in `crates/permit-server/migrations/` and embedded at compile time.

mod users;

pub use users::SqliteCredentialStore;

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open (creating if missing) the SQLite database at `db_path`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the file cannot be opened or created.
pub async fn create_pool(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or was modified after being applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // one connection, or each checkout would see a different empty database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
