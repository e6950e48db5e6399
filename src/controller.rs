//! Playback session controller
//!
//! The single owner of "what is happening right now". Tag scans, button
//! presses, and player completion callbacks all funnel into this state
//! machine:
//!
//! ```text
//! IDLE -> CHECK_LIMITS -> LOADING -> PLAYING -> FINISHED -> IDLE
//! ```
//!
//! with early exits back to IDLE from CHECK_LIMITS (limit denied) and
//! LOADING (unknown tag, missing media, missing file). All session fields
//! sit behind one tokio `Mutex`; every operation runs its whole
//! decide-and-commit sequence under that lock, so events can never
//! interleave mid-decision. Events arriving while the session is non-IDLE
//! are dropped, not queued.
//!
//! The lock is held across the store reads in the decision sequence. The
//! store is a local SQLite pool, so the critical section stays short; the
//! at-most-one-session guarantee requires the whole sequence to be atomic
//! anyway.

use std::sync::Arc;

use sqlx::{Pool, Sqlite};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::events::ControllerEvent;
use crate::hardware::{Buzzer, LedStrip};
use crate::limits::check_video_limit;
use crate::models::{MediaType, PlaybackState, VideoStats};
use crate::player::{PlaybackEnded, Player};

/// Session fields protected by the controller lock.
#[derive(Default)]
struct Session {
    state: PlaybackState,
    log_id: Option<i64>,
    media_id: Option<i64>,
    tag_uid: Option<String>,
    /// Active session was flagged as the last allowed video today.
    last_video: bool,
    register_mode: bool,
    last_scanned_uid: Option<String>,
}

/// Read-only status snapshot for external observers.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub state: PlaybackState,
    pub register_mode: bool,
    pub last_scanned_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now_playing: Option<NowPlaying>,
    pub video_stats: VideoStatsStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct NowPlaying {
    pub title: String,
    pub media_type: MediaType,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoStatsStatus {
    pub count: u32,
    pub total_minutes: f64,
    pub limit_count: u32,
    pub limit_minutes: u32,
}

pub struct Controller {
    pool: Pool<Sqlite>,
    config: Config,
    player: Arc<dyn Player>,
    leds: Arc<dyn LedStrip>,
    buzzer: Arc<dyn Buzzer>,
    session: Mutex<Session>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl Controller {
    pub fn new(
        pool: Pool<Sqlite>,
        config: Config,
        player: Arc<dyn Player>,
        leds: Arc<dyn LedStrip>,
        buzzer: Arc<dyn Buzzer>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(100);
        leds.idle();
        Arc::new(Self {
            pool,
            config,
            player,
            leds,
            buzzer,
            session: Mutex::new(Session::default()),
            event_tx,
        })
    }

    /// Consume the player's completion channel. Called exactly once at
    /// startup; the returned task ends when the channel closes.
    pub fn spawn_completion_task(
        self: &Arc<Self>,
        mut done_rx: mpsc::UnboundedReceiver<PlaybackEnded>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while done_rx.recv().await.is_some() {
                if let Err(e) = controller.on_playback_end().await {
                    error!("Error handling playback completion: {}", e);
                }
            }
            debug!("Completion channel closed");
        })
    }

    /// Subscribe to controller events (SSE).
    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }

    /// Entry point for the tag-polling loop.
    ///
    /// In register mode the UID is captured for the registration workflow
    /// and playback is untouched. Otherwise a scan is accepted only from
    /// IDLE; scans during an active session are dropped.
    pub async fn on_tag_scanned(&self, uid: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        session.last_scanned_uid = Some(uid.to_string());
        self.emit(ControllerEvent::TagScanned {
            uid: uid.to_string(),
        });

        if session.register_mode {
            info!("Register mode: captured UID {}", uid);
            self.buzzer.scan_confirm();
            self.leds.scan_feedback();
            return Ok(());
        }

        if session.state != PlaybackState::Idle {
            debug!("Ignoring tag {}: state is {}", uid, session.state.as_str());
            return Ok(());
        }

        self.process_tag(&mut session, uid).await
    }

    /// The decide-and-start sequence. Runs with the session lock held.
    ///
    /// A store error mid-sequence resets the session to IDLE before
    /// propagating; the controller must stay available for the next scan.
    async fn process_tag(&self, session: &mut Session, uid: &str) -> Result<()> {
        let result = self.try_process_tag(session, uid).await;
        if let Err(ref e) = result {
            error!("Scan processing failed: {}", e);
            self.buzzer.error();
            self.cleanup(session);
        }
        result
    }

    async fn try_process_tag(&self, session: &mut Session, uid: &str) -> Result<()> {
        let tag = match db::tags::get_tag(&self.pool, uid).await? {
            Some(tag) => tag,
            None => {
                warn!("Unknown tag: {}", uid);
                self.buzzer.error();
                return Ok(());
            }
        };

        let media = match db::media::get_media(&self.pool, tag.media_id).await? {
            Some(media) => media,
            None => {
                error!("Tag {} points to missing media {}", uid, tag.media_id);
                self.buzzer.error();
                return Ok(());
            }
        };

        self.set_state(session, PlaybackState::CheckLimits);
        session.last_video = false;

        if media.media_type == MediaType::Video {
            // Stats and settings are read together under the lock: one
            // atomic snapshot per decision.
            let stats = db::log::get_today_video_stats(&self.pool).await?;
            let (max_count, max_minutes) = db::settings::get_video_limits(&self.pool).await?;

            let verdict =
                check_video_limit(stats, max_count, max_minutes, media.duration_s.unwrap_or(0));

            if !verdict.allowed {
                info!("Video limit reached: {}", verdict.reason);
                self.buzzer.all_done();
                self.leds.all_done_feedback();
                self.emit(ControllerEvent::LimitDenied {
                    reason: verdict.reason,
                });
                self.set_state(session, PlaybackState::Idle);
                return Ok(());
            }

            if verdict.is_last {
                info!("This is the last allowed video today");
                session.last_video = true;
                self.buzzer.last_video_warning();
                self.leds.last_video_warning();
                self.emit(ControllerEvent::LastVideoWarning);
            }
        }

        self.set_state(session, PlaybackState::Loading);

        let filepath = self.config.media_path(media.media_type, &media.filename);
        if !crate::config::file_exists(&filepath) {
            error!("Media file not found: {}", filepath.display());
            self.buzzer.error();
            self.set_state(session, PlaybackState::Idle);
            self.leds.idle();
            return Ok(());
        }

        self.buzzer.scan_confirm();
        self.leds.scan_feedback();

        session.media_id = Some(media.id);
        session.tag_uid = Some(uid.to_string());
        session.log_id = Some(db::log::log_playback_start(&self.pool, media.id, Some(uid)).await?);

        self.set_state(session, PlaybackState::Playing);
        self.leds.playing_animation();

        if let Err(e) = self.player.play(&filepath, media.media_type) {
            error!("Failed to start playback: {}", e);
            if let Some(log_id) = session.log_id {
                db::log::log_playback_end(&self.pool, log_id, false).await?;
            }
            self.leds.off();
            self.cleanup(session);
            return Ok(());
        }

        info!("Playing '{}' ({})", media.title, media.media_type);
        self.emit(ControllerEvent::PlaybackStarted {
            media_id: media.id,
            title: media.title,
        });
        Ok(())
    }

    /// Callback for natural end of playback. Ignored unless PLAYING, which
    /// also makes stale completions from an already-stopped session no-ops.
    pub async fn on_playback_end(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.state != PlaybackState::Playing {
            debug!("Ignoring completion: state is {}", session.state.as_str());
            return Ok(());
        }

        let result = self.finish_session(&mut session).await;
        if let Err(ref e) = result {
            error!("Completion handling failed: {}", e);
            self.cleanup(&mut session);
        }
        result
    }

    async fn finish_session(&self, session: &mut Session) -> Result<()> {
        self.set_state(session, PlaybackState::Finished);
        info!("Playback finished");

        if let Some(log_id) = session.log_id {
            db::log::log_playback_end(&self.pool, log_id, true).await?;
        }

        if session.last_video {
            self.buzzer.all_done();
            self.leds.all_done_feedback();
        } else {
            self.leds.off();
        }

        self.emit(ControllerEvent::PlaybackFinished { completed: true });
        self.cleanup(session);
        Ok(())
    }

    /// Play/pause button. No-op unless PLAYING; toggling pause does not
    /// leave the PLAYING state.
    pub async fn on_play_pause(&self) {
        let session = self.session.lock().await;
        if session.state == PlaybackState::Playing {
            self.player.pause_toggle();
        }
    }

    /// Stop button. No-op unless PLAYING.
    pub async fn on_stop(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.state != PlaybackState::Playing {
            return Ok(());
        }

        info!("Stop requested");
        self.player.stop();

        let result = match session.log_id {
            Some(log_id) => db::log::log_playback_end(&self.pool, log_id, false).await,
            None => Ok(()),
        };
        if let Err(ref e) = result {
            error!("Failed to close log row on stop: {}", e);
        }

        self.leds.off();
        self.emit(ControllerEvent::PlaybackFinished { completed: false });
        self.cleanup(&mut session);
        result
    }

    pub async fn register_mode(&self) -> bool {
        self.session.lock().await.register_mode
    }

    pub async fn set_register_mode(&self, enabled: bool) {
        let mut session = self.session.lock().await;
        session.register_mode = enabled;
        if enabled {
            info!("Register mode enabled");
        } else {
            info!("Register mode disabled");
        }
        self.emit(ControllerEvent::RegisterModeChanged { enabled });
    }

    pub async fn last_scanned_uid(&self) -> Option<String> {
        self.session.lock().await.last_scanned_uid.clone()
    }

    /// Read-only status snapshot. The session fields are copied under the
    /// lock; the catalog/stats reads happen after it is released, so status
    /// requests never stall a state transition.
    pub async fn status(&self) -> Result<Status> {
        let (state, register_mode, last_scanned_uid, media_id) = {
            let session = self.session.lock().await;
            (
                session.state,
                session.register_mode,
                session.last_scanned_uid.clone(),
                session.media_id,
            )
        };

        let now_playing = match media_id {
            Some(id) => db::media::get_media(&self.pool, id)
                .await?
                .map(|m| NowPlaying {
                    title: m.title,
                    media_type: m.media_type,
                    thumbnail: m.thumbnail,
                }),
            None => None,
        };

        let stats: VideoStats = db::log::get_today_video_stats(&self.pool).await?;
        let (limit_count, limit_minutes) = db::settings::get_video_limits(&self.pool).await?;

        Ok(Status {
            state,
            register_mode,
            last_scanned_uid,
            now_playing,
            video_stats: VideoStatsStatus {
                count: stats.count,
                total_minutes: (stats.total_minutes * 10.0).round() / 10.0,
                limit_count,
                limit_minutes,
            },
        })
    }

    /// Shutdown policy: an in-flight session is stopped and its log row
    /// closed as not-completed, then feedback is cleared.
    pub async fn shutdown(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.state == PlaybackState::Playing {
            info!("Shutting down with active session: closing log as stopped");
            self.player.stop();
            if let Some(log_id) = session.log_id {
                db::log::log_playback_end(&self.pool, log_id, false).await?;
            }
            self.cleanup(&mut session);
        }
        self.leds.off();
        Ok(())
    }

    fn set_state(&self, session: &mut Session, to: PlaybackState) {
        if session.state != to {
            self.emit(ControllerEvent::StateChanged {
                from: session.state,
                to,
            });
        }
        session.state = to;
    }

    /// Reset session fields and return to IDLE. Lock must be held.
    fn cleanup(&self, session: &mut Session) {
        session.log_id = None;
        session.media_id = None;
        session.tag_uid = None;
        session.last_video = false;
        self.set_state(session, PlaybackState::Idle);
        self.leds.idle();
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.event_tx.send(event);
    }
}
