//! Database initialization
//!
//! Opens the SQLite pool (WAL mode, foreign keys on), creates the schema if
//! missing, and seeds default settings.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::DEFAULT_SETTINGS;
use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS media (
    id          INTEGER PRIMARY KEY,
    title       TEXT NOT NULL,
    filename    TEXT NOT NULL,
    media_type  TEXT NOT NULL,
    source_url  TEXT,
    thumbnail   TEXT,
    duration_s  INTEGER,
    created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tags (
    uid         TEXT PRIMARY KEY,
    media_id    INTEGER NOT NULL,
    label       TEXT,
    created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (media_id) REFERENCES media(id)
);

CREATE TABLE IF NOT EXISTS playback_log (
    id          INTEGER PRIMARY KEY,
    media_id    INTEGER NOT NULL,
    tag_uid     TEXT,
    started_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    ended_at    TIMESTAMP,
    completed   BOOLEAN NOT NULL DEFAULT 0,
    FOREIGN KEY (media_id) REFERENCES media(id)
);

CREATE TABLE IF NOT EXISTS settings (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL
);
"#;

/// Open (creating if necessary) the database at `path` and initialize it.
pub async fn connect(path: &Path) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    info!("Database ready at {}", path.display());
    Ok(pool)
}

/// Create tables and seed default settings. Idempotent.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }

    for (key, value) in DEFAULT_SETTINGS {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::test_util::memory_pool;

    #[tokio::test]
    async fn test_schema_seeds_defaults() {
        let pool = memory_pool().await;

        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'daily_video_limit_count'")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert_eq!(value.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = memory_pool().await;
        // Second run must not fail or duplicate settings
        crate::db::init_schema(&pool).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE key = 'limit_reset_hour'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
