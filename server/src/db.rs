//! Connection pool setup.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS todo_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    is_complete BOOLEAN NOT NULL DEFAULT 0,
    secret TEXT,
    version INTEGER NOT NULL DEFAULT 0
)";

pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
    let mut pool = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        // Closing the only connection would drop the database with it.
        pool = pool.min_connections(1).idle_timeout(None).max_lifetime(None);
    }
    pool.connect_with(options).await
}

/// Create `todo_items` if it does not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Connect and make sure the schema is in place.
pub async fn open(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let pool = connect(config).await?;
    ensure_schema(&pool).await?;
    tracing::debug!(url = %config.url, max_connections = config.max_connections, "database ready");
    Ok(pool)
}
