//! Player port
//!
//! The controller drives playback through the [`Player`] trait and learns
//! about natural completion through a single mpsc channel wired up once at
//! startup. Concrete media engines (mpv, gstreamer, ...) live outside this
//! crate; the in-tree [`stub::StubPlayer`] simulates playback with a
//! cancellable delayed task firing the same channel.

pub mod stub;

use std::path::Path;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::models::MediaType;

/// End-of-playback notification. Sent only when playback ends on its own,
/// never for an explicit [`Player::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackEnded;

/// Create the completion channel shared by the player and the controller.
pub fn completion_channel() -> (
    mpsc::UnboundedSender<PlaybackEnded>,
    mpsc::UnboundedReceiver<PlaybackEnded>,
) {
    mpsc::unbounded_channel()
}

/// Playback engine port.
pub trait Player: Send + Sync {
    /// Start playing a file. If something is already playing it is stopped
    /// first; streams never overlap. Returns once playback has been
    /// launched, not when it finishes.
    fn play(&self, path: &Path, media_type: MediaType) -> Result<()>;

    /// Stop playback. Effective synchronously: after this returns the
    /// player is no longer playing and no completion event will be sent for
    /// the stopped stream.
    fn stop(&self);

    /// Toggle pause. No-op when nothing is playing.
    fn pause_toggle(&self);

    /// Whether a stream is currently playing (paused counts as playing).
    fn is_playing(&self) -> bool;
}
