use crate::db_migration;
use crate::errors::{DbError, DbResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Open (creating if needed) a SQLite database and bring its schema up to date
pub async fn connect(database_url: &str) -> DbResult<SqlitePool> {
    if database_url.contains(":memory:") {
        let pool = connect_in_memory().await?;
        db_migration::run_migrations(&pool).await?;
        return Ok(pool);
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DbError::Other(format!("Invalid database URL {}: {}", database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    db_migration::run_migrations(&pool).await?;
    log::info!("Local store ready at {}", database_url);
    Ok(pool)
}

/// Single-connection in-memory database; every pooled connection would
/// otherwise see its own empty database
pub async fn connect_in_memory() -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DbError::Other(e.to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}
