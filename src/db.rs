//! Database connection for the ownership store.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DbConfig;

/// Open (creating if missing) the SQLite database holding the
/// owner/asset/relationship records.
///
/// The pool is sized at two connections: the batch is single-threaded and
/// writes sequentially, the second connection only serves read views while
/// a reconcile transaction is open.
pub async fn connect(config: &DbConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_creates_missing_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = DbConfig {
            path: tmp.path().join("nested/dir/steward.sqlite"),
        };

        let pool = connect(&config).await.unwrap();
        assert!(config.path.exists());

        // The connection is usable straight away.
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(one, 1);
        pool.close().await;
    }
}
