//! Controller event types
//!
//! Broadcast over a `tokio::sync::broadcast` channel owned by the
//! controller and streamed to dashboard clients via SSE.

use serde::Serialize;

use crate::models::PlaybackState;

/// Events published by the controller. Send errors are ignored; no
/// subscribers is fine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    StateChanged {
        from: PlaybackState,
        to: PlaybackState,
    },
    TagScanned {
        uid: String,
    },
    LimitDenied {
        reason: String,
    },
    LastVideoWarning,
    PlaybackStarted {
        media_id: i64,
        title: String,
    },
    PlaybackFinished {
        completed: bool,
    },
    RegisterModeChanged {
        enabled: bool,
    },
}

impl ControllerEvent {
    /// Event name used for the SSE `event:` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::StateChanged { .. } => "state_changed",
            ControllerEvent::TagScanned { .. } => "tag_scanned",
            ControllerEvent::LimitDenied { .. } => "limit_denied",
            ControllerEvent::LastVideoWarning => "last_video_warning",
            ControllerEvent::PlaybackStarted { .. } => "playback_started",
            ControllerEvent::PlaybackFinished { .. } => "playback_finished",
            ControllerEvent::RegisterModeChanged { .. } => "register_mode_changed",
        }
    }
}
