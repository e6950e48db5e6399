//! Settings access
//!
//! Read/write settings from the settings table (key-value store). The
//! controller re-reads the limit settings on every check; nothing here is
//! cached.

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::{Pool, Row, Sqlite};

use crate::config::{settings_keys, DEFAULT_LIMIT_COUNT, DEFAULT_LIMIT_MINUTES};
use crate::error::{Error, Result};

/// Generic setting getter. Returns None if the key is absent.
pub async fn get_setting<T: FromStr>(pool: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter. Inserts or updates.
pub async fn set_setting<T: ToString>(pool: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// All settings as a key → string map.
pub async fn get_all_settings(pool: &Pool<Sqlite>) -> Result<HashMap<String, String>> {
    let rows = sqlx::query("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        map.insert(row.try_get("key")?, row.try_get("value")?);
    }
    Ok(map)
}

/// The configured daily video ceilings as (max count, max minutes).
/// Missing or unparsable values fall back to the defaults.
pub async fn get_video_limits(pool: &Pool<Sqlite>) -> Result<(u32, u32)> {
    let count = get_setting::<u32>(pool, settings_keys::DAILY_VIDEO_LIMIT_COUNT)
        .await
        .unwrap_or(None)
        .unwrap_or(DEFAULT_LIMIT_COUNT);
    let minutes = get_setting::<u32>(pool, settings_keys::DAILY_VIDEO_LIMIT_MINUTES)
        .await
        .unwrap_or(None)
        .unwrap_or(DEFAULT_LIMIT_MINUTES);
    Ok((count, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;

    #[tokio::test]
    async fn test_generic_setting_get_set() {
        let pool = memory_pool().await;

        set_setting(&pool, "test_int", 42).await.unwrap();
        let value: Option<i32> = get_setting(&pool, "test_int").await.unwrap();
        assert_eq!(value, Some(42));

        let value: Option<String> = get_setting(&pool, "nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_setting_update_upserts() {
        let pool = memory_pool().await;

        set_setting(&pool, "test_key", "value1").await.unwrap();
        set_setting(&pool, "test_key", "value2").await.unwrap();
        let value: Option<String> = get_setting(&pool, "test_key").await.unwrap();
        assert_eq!(value, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_video_limits_defaults() {
        let pool = memory_pool().await;
        // Seeded defaults
        assert_eq!(get_video_limits(&pool).await.unwrap(), (5, 60));

        set_setting(&pool, settings_keys::DAILY_VIDEO_LIMIT_COUNT, 3)
            .await
            .unwrap();
        set_setting(&pool, settings_keys::DAILY_VIDEO_LIMIT_MINUTES, 45)
            .await
            .unwrap();
        assert_eq!(get_video_limits(&pool).await.unwrap(), (3, 45));
    }

    #[tokio::test]
    async fn test_unparsable_setting_errors() {
        let pool = memory_pool().await;
        set_setting(&pool, "test_num", "not-a-number").await.unwrap();
        let result: Result<Option<u32>> = get_setting(&pool, "test_num").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_all_settings_contains_defaults() {
        let pool = memory_pool().await;
        let all = get_all_settings(&pool).await.unwrap();
        assert_eq!(all.get("limit_reset_hour").map(String::as_str), Some("6"));
        assert!(all.contains_key("speaker_address"));
    }
}
