//! Simulated hardware backend
//!
//! Scans and button presses are injected from tests or the dev API; feedback
//! cues are logged and recorded so tests can assert on them. The reader and
//! buttons apply the same dedup/debounce windows the real peripherals need,
//! so the simulation exercises the identical contract.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{ButtonAction, Buttons, Buzzer, LedStrip, ScanInjector, TagReader};

struct ReaderInner {
    queue: VecDeque<String>,
    last_uid: Option<String>,
    last_read: Option<Instant>,
}

/// Simulated tag reader with an injectable scan queue. Repeat reads of the
/// same UID inside the dedup window are suppressed.
pub struct MockTagReader {
    dedup_window: Duration,
    inner: Mutex<ReaderInner>,
}

impl MockTagReader {
    pub fn new(dedup_window: Duration) -> Self {
        Self {
            dedup_window,
            inner: Mutex::new(ReaderInner {
                queue: VecDeque::new(),
                last_uid: None,
                last_read: None,
            }),
        }
    }
}

impl TagReader for MockTagReader {
    fn poll_uid(&self) -> Option<String> {
        let mut inner = self.inner.lock().ok()?;
        let uid = inner.queue.pop_front()?;

        let now = Instant::now();
        if inner.last_uid.as_deref() == Some(uid.as_str()) {
            if let Some(last_read) = inner.last_read {
                if now.duration_since(last_read) < self.dedup_window {
                    debug!("[MockTagReader] Suppressed duplicate UID: {}", uid);
                    return None;
                }
            }
        }

        inner.last_uid = Some(uid.clone());
        inner.last_read = Some(now);
        info!("[MockTagReader] Read UID: {}", uid);
        Some(uid)
    }
}

impl ScanInjector for MockTagReader {
    fn inject(&self, uid: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.queue.push_back(uid.to_string());
        }
    }
}

struct ButtonsInner {
    queue: VecDeque<ButtonAction>,
    last_action: Option<(ButtonAction, Instant)>,
}

/// Simulated buttons with an injectable action queue. Repeats of the same
/// action inside the debounce window are suppressed.
pub struct MockButtons {
    debounce: Duration,
    inner: Mutex<ButtonsInner>,
}

impl MockButtons {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            inner: Mutex::new(ButtonsInner {
                queue: VecDeque::new(),
                last_action: None,
            }),
        }
    }

    pub fn press(&self, action: ButtonAction) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.queue.push_back(action);
        }
    }
}

impl Buttons for MockButtons {
    fn poll(&self) -> Option<ButtonAction> {
        let mut inner = self.inner.lock().ok()?;
        let action = inner.queue.pop_front()?;

        let now = Instant::now();
        if let Some((last_action, last_time)) = inner.last_action {
            if last_action == action && now.duration_since(last_time) < self.debounce {
                debug!("[MockButtons] Debounced {:?}", action);
                return None;
            }
        }

        inner.last_action = Some((action, now));
        Some(action)
    }
}

/// Named LED cues, recorded in order by [`MockLedStrip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCue {
    ScanFeedback,
    PlayingAnimation,
    LastVideoWarning,
    AllDoneFeedback,
    Idle,
    Off,
}

/// Simulated LED strip: logs and records each cue.
pub struct MockLedStrip {
    cues: Mutex<Vec<LedCue>>,
}

impl MockLedStrip {
    pub fn new() -> Self {
        Self {
            cues: Mutex::new(Vec::new()),
        }
    }

    /// Cues issued so far, in order.
    pub fn cues(&self) -> Vec<LedCue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, cue: LedCue) {
        info!("[MockLedStrip] {:?}", cue);
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

impl Default for MockLedStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl LedStrip for MockLedStrip {
    fn scan_feedback(&self) {
        self.record(LedCue::ScanFeedback);
    }

    fn playing_animation(&self) {
        self.record(LedCue::PlayingAnimation);
    }

    fn last_video_warning(&self) {
        self.record(LedCue::LastVideoWarning);
    }

    fn all_done_feedback(&self) {
        self.record(LedCue::AllDoneFeedback);
    }

    fn idle(&self) {
        self.record(LedCue::Idle);
    }

    fn off(&self) {
        self.record(LedCue::Off);
    }
}

/// Named buzzer cues, recorded in order by [`MockBuzzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerCue {
    ScanConfirm,
    LastVideoWarning,
    AllDone,
    Error,
}

/// Simulated buzzer: logs and records each cue.
pub struct MockBuzzer {
    cues: Mutex<Vec<BuzzerCue>>,
}

impl MockBuzzer {
    pub fn new() -> Self {
        Self {
            cues: Mutex::new(Vec::new()),
        }
    }

    /// Cues issued so far, in order.
    pub fn cues(&self) -> Vec<BuzzerCue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, cue: BuzzerCue) {
        info!("[MockBuzzer] {:?}", cue);
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

impl Default for MockBuzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer for MockBuzzer {
    fn scan_confirm(&self) {
        self.record(BuzzerCue::ScanConfirm);
    }

    fn last_video_warning(&self) {
        self.record(BuzzerCue::LastVideoWarning);
    }

    fn all_done(&self) {
        self.record(BuzzerCue::AllDone);
    }

    fn error(&self) {
        self.record(BuzzerCue::Error);
    }
}
