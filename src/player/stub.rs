//! Stub player
//!
//! Simulates playback without a media engine: `play` starts a delayed task
//! that fires the completion channel after a fixed duration, `stop` cancels
//! it. Used in dev mode and tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{PlaybackEnded, Player};
use crate::error::Result;
use crate::models::MediaType;

struct Inner {
    timer: Option<JoinHandle<()>>,
    playing: bool,
    paused: bool,
}

pub struct StubPlayer {
    play_duration: Duration,
    done_tx: mpsc::UnboundedSender<PlaybackEnded>,
    inner: Arc<Mutex<Inner>>,
}

impl StubPlayer {
    pub fn new(play_duration: Duration, done_tx: mpsc::UnboundedSender<PlaybackEnded>) -> Self {
        Self {
            play_duration,
            done_tx,
            inner: Arc::new(Mutex::new(Inner {
                timer: None,
                playing: false,
                paused: false,
            })),
        }
    }
}

impl Player for StubPlayer {
    fn play(&self, path: &Path, media_type: MediaType) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| crate::error::Error::Playback("player lock poisoned".into()))?;

        // No overlap: cancel any stream still running
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        info!(
            "[StubPlayer] Playing {} ({}), ends in {:?}",
            path.display(),
            media_type,
            self.play_duration
        );
        inner.playing = true;
        inner.paused = false;

        let duration = self.play_duration;
        let done_tx = self.done_tx.clone();
        let shared = Arc::clone(&self.inner);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Ok(mut inner) = shared.lock() {
                inner.playing = false;
                inner.paused = false;
                inner.timer = None;
            }
            debug!("[StubPlayer] Playback finished");
            let _ = done_tx.send(PlaybackEnded);
        }));

        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            if inner.playing {
                info!("[StubPlayer] Stopped");
            }
            inner.playing = false;
            inner.paused = false;
        }
    }

    fn pause_toggle(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.playing {
                inner.paused = !inner.paused;
                info!("[StubPlayer] Pause toggled: {}", inner.paused);
                // The stub timer keeps running while paused; real backends
                // suspend the stream here.
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().map(|i| i.playing).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_completion_fires_after_duration() {
        let (tx, mut rx) = super::super::completion_channel();
        let player = StubPlayer::new(Duration::from_millis(20), tx);

        player
            .play(&PathBuf::from("/tmp/clip.mp4"), MediaType::Video)
            .unwrap();
        assert!(player.is_playing());

        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("completion not delivered")
            .expect("channel closed");
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_stop_cancels_completion() {
        let (tx, mut rx) = super::super::completion_channel();
        let player = StubPlayer::new(Duration::from_millis(20), tx);

        player
            .play(&PathBuf::from("/tmp/clip.mp4"), MediaType::Video)
            .unwrap();
        player.stop();
        assert!(!player.is_playing());

        // No completion event for a stopped stream
        let result = tokio::time::timeout(Duration::from_millis(80), rx.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_replay_aborts_prior_stream() {
        let (tx, mut rx) = super::super::completion_channel();
        let player = StubPlayer::new(Duration::from_millis(30), tx);

        player
            .play(&PathBuf::from("/tmp/a.mp3"), MediaType::Audio)
            .unwrap();
        player
            .play(&PathBuf::from("/tmp/b.mp3"), MediaType::Audio)
            .unwrap();

        // Exactly one completion: the second stream's
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("completion not delivered")
            .expect("channel closed");
        let extra = tokio::time::timeout(Duration::from_millis(60), rx.recv()).await;
        assert!(extra.is_err());
    }
}
