//! Playback log queries
//!
//! One row per playback attempt that reached the committed point. The daily
//! video budget is computed from completed video rows inside the current
//! reset-hour window.

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::{FromRow, Pool, Row, Sqlite};

use crate::config::{settings_keys, DEFAULT_RESET_HOUR};
use crate::error::Result;
use crate::models::VideoStats;

/// Open a log row for a playback attempt. Returns the row id, which the
/// controller keeps for the matching [`log_playback_end`] call.
pub async fn log_playback_start(
    pool: &Pool<Sqlite>,
    media_id: i64,
    tag_uid: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO playback_log (media_id, tag_uid) VALUES (?, ?)")
        .bind(media_id)
        .bind(tag_uid)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Close a log row. `completed = true` means playback ran to its natural
/// end. A row already closed is left untouched, so a stale double-close
/// cannot overwrite the recorded outcome.
pub async fn log_playback_end(pool: &Pool<Sqlite>, log_id: i64, completed: bool) -> Result<()> {
    sqlx::query(
        "UPDATE playback_log SET ended_at = CURRENT_TIMESTAMP, completed = ? \
         WHERE id = ? AND ended_at IS NULL",
    )
    .bind(completed)
    .bind(log_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// A playback log row joined with its media title/type, for the history API.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub media_id: i64,
    pub title: String,
    pub media_type: String,
    pub tag_uid: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Recent playback history, newest first.
pub async fn get_history(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, HistoryEntry>(
        "SELECT p.id, p.media_id, m.title, m.media_type, p.tag_uid, \
                p.started_at, p.ended_at, p.completed \
         FROM playback_log p JOIN media m ON p.media_id = m.id \
         ORDER BY p.started_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Start of the daily window for a given local time and reset hour: today's
/// reset time if we're past it, otherwise yesterday's.
pub fn window_start(now: NaiveDateTime, reset_hour: u32) -> NaiveDateTime {
    let reset_time = NaiveTime::from_hms_opt(reset_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today_reset = now.date().and_time(reset_time);
    if now.time() < reset_time {
        today_reset - Duration::days(1)
    } else {
        today_reset
    }
}

/// Aggregate completed video plays inside the current daily window.
///
/// The window is anchored at the `limit_reset_hour` setting in local time;
/// row timestamps are UTC, so the boundary is converted before the query.
/// A missing or unparsable reset hour falls back to the default instead of
/// failing the limit check.
pub async fn get_today_video_stats(pool: &Pool<Sqlite>) -> Result<VideoStats> {
    let reset_hour =
        crate::db::settings::get_setting::<u32>(pool, settings_keys::LIMIT_RESET_HOUR)
            .await
            .unwrap_or(None)
            .unwrap_or(DEFAULT_RESET_HOUR);

    let local_start = window_start(Local::now().naive_local(), reset_hour);
    let utc_start = Local
        .from_local_datetime(&local_start)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() - Duration::days(1)); // DST gap

    let row = sqlx::query(
        "SELECT COUNT(*) AS cnt, COALESCE(SUM(m.duration_s), 0) AS total_s \
         FROM playback_log p JOIN media m ON p.media_id = m.id \
         WHERE m.media_type = 'video' AND p.completed = 1 AND p.started_at >= ?",
    )
    .bind(utc_start.format("%Y-%m-%d %H:%M:%S").to_string())
    .fetch_one(pool)
    .await?;

    let count: i64 = row.try_get("cnt")?;
    let total_s: i64 = row.try_get("total_s")?;

    Ok(VideoStats {
        count: count as u32,
        total_minutes: total_s as f64 / 60.0,
    })
}
