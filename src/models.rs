//! Data model shared across the database layer, controller, and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of media a tag can point at. Determines the storage directory and
/// whether playback counts against the daily video budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(MediaType::Audio),
            "video" => Ok(MediaType::Video),
            other => Err(crate::error::Error::Internal(format!(
                "Unknown media type: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of the playback session.
///
/// IDLE is both the initial state and where every session cycle ends.
/// CHECK_LIMITS and LOADING are transient: they exist only inside the
/// controller's locked decide-and-start sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    CheckLimits,
    Loading,
    Playing,
    Finished,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::CheckLimits => "check_limits",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Finished => "finished",
        }
    }
}

/// A media item in the catalog. Immutable once created except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub media_type: MediaType,
    pub source_url: Option<String>,
    pub thumbnail: Option<String>,
    pub duration_s: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields for inserting a new media row (id assigned by the database).
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedia {
    pub title: String,
    pub filename: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration_s: Option<i64>,
}

/// A physical token mapped to exactly one media item. Many tags may map to
/// the same media; re-registering a UID re-points it (last wins).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub uid: String,
    pub media_id: i64,
    pub label: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One playback attempt that reached the committed point.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaybackLog {
    pub id: i64,
    pub media_id: i64,
    pub tag_uid: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Aggregate over completed video plays in the current daily window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VideoStats {
    pub count: u32,
    pub total_minutes: f64,
}
