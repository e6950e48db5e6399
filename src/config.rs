//! Runtime configuration
//!
//! Paths, polling intervals, and hardware backend selection. Values come
//! from command-line flags / environment (see `Args` in main.rs); everything
//! derived lives here so the rest of the crate never touches `std::env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Which hardware backend set to instantiate at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareBackend {
    /// Simulated hardware: scans are injected via the API, feedback is logged.
    Mock,
}

impl std::str::FromStr for HardwareBackend {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mock" | "dev" => Ok(HardwareBackend::Mock),
            other => Err(crate::error::Error::Config(format!(
                "Unknown hardware backend: {}",
                other
            ))),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base data directory (database + media tree)
    pub data_dir: PathBuf,
    /// Hardware backend selection
    pub backend: HardwareBackend,
    /// Tag reader poll interval
    pub tag_poll_interval: Duration,
    /// Button poll interval
    pub button_poll_interval: Duration,
    /// Repeat reads of the same UID inside this window are suppressed, so a
    /// token resting on the reader does not retrigger playback
    pub tag_dedup_window: Duration,
    /// Repeat reports of the same button inside this window are suppressed
    pub button_debounce: Duration,
    /// Stub player playback duration (simulated backend only)
    pub stub_play_duration: Duration,
}

impl Config {
    pub fn new(data_dir: PathBuf, backend: HardwareBackend) -> Self {
        Self {
            data_dir,
            backend,
            tag_poll_interval: Duration::from_millis(200),
            button_poll_interval: Duration::from_millis(50),
            tag_dedup_window: Duration::from_secs(2),
            button_debounce: Duration::from_millis(200),
            stub_play_duration: Duration::from_secs(3),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("tagbox.db")
    }

    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.media_dir().join("audio")
    }

    pub fn video_dir(&self) -> PathBuf {
        self.media_dir().join("video")
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.media_dir().join("thumbnails")
    }

    /// Resolve the on-disk path for a media file by type.
    pub fn media_path(&self, media_type: crate::models::MediaType, filename: &str) -> PathBuf {
        match media_type {
            crate::models::MediaType::Video => self.video_dir().join(filename),
            crate::models::MediaType::Audio => self.audio_dir().join(filename),
        }
    }

    /// Create the media directory tree if it does not exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.audio_dir(), self.video_dir(), self.thumbnail_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Settings keys consumed by the controller (stored in the settings table).
pub mod settings_keys {
    pub const DAILY_VIDEO_LIMIT_COUNT: &str = "daily_video_limit_count";
    pub const DAILY_VIDEO_LIMIT_MINUTES: &str = "daily_video_limit_minutes";
    pub const LIMIT_RESET_HOUR: &str = "limit_reset_hour";
    pub const SPEAKER_ADDRESS: &str = "speaker_address";
}

/// Default values seeded into the settings table at startup.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    (settings_keys::DAILY_VIDEO_LIMIT_COUNT, "5"),
    (settings_keys::DAILY_VIDEO_LIMIT_MINUTES, "60"),
    (settings_keys::LIMIT_RESET_HOUR, "6"),
    (settings_keys::SPEAKER_ADDRESS, ""),
];

/// Default daily video count limit when the setting is missing or unparsable.
pub const DEFAULT_LIMIT_COUNT: u32 = 5;
/// Default daily video minutes limit when the setting is missing or unparsable.
pub const DEFAULT_LIMIT_MINUTES: u32 = 60;
/// Default daily reset hour (local time).
pub const DEFAULT_RESET_HOUR: u32 = 6;

/// Returns true when `path` exists and is a regular file.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    #[test]
    fn test_media_path_by_type() {
        let cfg = Config::new(PathBuf::from("/data"), HardwareBackend::Mock);
        assert_eq!(
            cfg.media_path(MediaType::Video, "clip.mp4"),
            PathBuf::from("/data/media/video/clip.mp4")
        );
        assert_eq!(
            cfg.media_path(MediaType::Audio, "song.mp3"),
            PathBuf::from("/data/media/audio/song.mp3")
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "mock".parse::<HardwareBackend>().unwrap(),
            HardwareBackend::Mock
        );
        assert!("gpio9000".parse::<HardwareBackend>().is_err());
    }
}
