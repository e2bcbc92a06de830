//! # CourseHub DB
//!
//! SQLite connection pool setup.
//!
//! ```ignore
//! use coursehub_db::init_db_pool;
//!
//! let pool = init_db_pool().await?;
//! sqlx::migrate!("./migrations").run(&pool).await?;
//! ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

pub use sqlx::SqlitePool;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/coursehub.db?mode=rwc";

/// Opens a pool for `DATABASE_URL` (default [`DEFAULT_DATABASE_URL`]).
///
/// The database file is created when missing. Foreign keys are enforced so
/// course deletions cascade to files and exams.
pub async fn init_db_pool() -> Result<SqlitePool, sqlx::Error> {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    connect(&database_url).await
}

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = database_path(database_url).and_then(|p| p.parent().map(|p| p.to_owned())) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&parent).await.map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    info!(database_url = %database_url, "Database pool ready");
    Ok(pool)
}

fn database_path(database_url: &str) -> Option<std::path::PathBuf> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(std::path::PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path() {
        assert_eq!(
            database_path("sqlite://data/coursehub.db?mode=rwc"),
            Some(std::path::PathBuf::from("data/coursehub.db"))
        );
        assert_eq!(database_path("sqlite::memory:"), None);
        assert_eq!(database_path("sqlite://:memory:"), None);
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }
}
