// SQLite Connection Pool Setup

use std::time::Duration;

use dispatchq_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Create SQLite connection pool with WAL mode and a busy timeout
///
/// # Configuration
/// - `DISPATCHQ_POOL_SIZE`: Max connections (default: 10)
/// - `DISPATCHQ_BUSY_TIMEOUT`: Write-contention timeout in seconds (default: 5)
pub async fn create_pool(db_path: &str) -> Result<SqlitePool> {
    let max_connections: u32 = std::env::var("DISPATCHQ_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let busy_timeout_secs: u64 = std::env::var("DISPATCHQ_BUSY_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(busy_timeout_secs))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(format!("failed to open {db_path}: {e}")))?;

    Ok(pool)
}
