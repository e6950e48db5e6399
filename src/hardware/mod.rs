//! Hardware capability ports
//!
//! Narrow trait contracts for the peripherals the controller drives: tag
//! reader, buttons, LED strip, buzzer. Real GPIO backends live outside this
//! crate; the in-tree [`mock`] backend is used for development, tests, and
//! the API-driven simulation.
//!
//! Feedback calls are fire-and-forget: a backend must catch and log its own
//! failures rather than letting them abort a controller state transition.

pub mod mock;

use std::sync::Arc;

use crate::config::{Config, HardwareBackend};

/// Physical button actions reported by the button port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    PlayPause,
    Stop,
}

/// Proximity tag reader.
pub trait TagReader: Send + Sync {
    /// Non-blocking poll. Returns a hex UID string or None.
    ///
    /// Implementations must suppress duplicate reads of the same token
    /// within their dedup window, so a token resting on the reader does not
    /// retrigger playback every poll.
    fn poll_uid(&self) -> Option<String>;
}

/// Physical buttons.
pub trait Buttons: Send + Sync {
    /// Non-blocking poll. Implementations debounce physical bounce.
    fn poll(&self) -> Option<ButtonAction>;
}

/// Visual feedback cues. Starting a new cue cancels any in-progress
/// continuous cue.
pub trait LedStrip: Send + Sync {
    /// Quick flash on tag scan.
    fn scan_feedback(&self);
    /// Gentle breathing/pulse while playing (continuous until replaced).
    fn playing_animation(&self);
    /// Pulse yellow 3x.
    fn last_video_warning(&self);
    /// Pulse red 3x then fade off.
    fn all_done_feedback(&self);
    /// Dim idle glow.
    fn idle(&self);
    /// All LEDs off.
    fn off(&self);
}

/// Audio feedback cues.
pub trait Buzzer: Send + Sync {
    /// Short beep on successful tag scan.
    fn scan_confirm(&self);
    /// Gentle ascending tone.
    fn last_video_warning(&self);
    /// Calm descending melody.
    fn all_done(&self);
    /// Short error buzz.
    fn error(&self);
}

/// Out-of-band scan injection, available on simulated tag readers only.
/// Used by the dev API to drive scans without physical hardware.
pub trait ScanInjector: Send + Sync {
    fn inject(&self, uid: &str);
}

/// The full set of hardware ports selected at startup.
pub struct HardwareSet {
    pub tag_reader: Arc<dyn TagReader>,
    pub buttons: Arc<dyn Buttons>,
    pub leds: Arc<dyn LedStrip>,
    pub buzzer: Arc<dyn Buzzer>,
    /// Present only for simulated backends.
    pub scan_injector: Option<Arc<dyn ScanInjector>>,
}

/// Instantiate the hardware set for the configured backend, applying the
/// configured dedup/debounce windows.
pub fn create(config: &Config) -> HardwareSet {
    match config.backend {
        HardwareBackend::Mock => {
            let reader = Arc::new(mock::MockTagReader::new(config.tag_dedup_window));
            HardwareSet {
                tag_reader: reader.clone(),
                buttons: Arc::new(mock::MockButtons::new(config.button_debounce)),
                leds: Arc::new(mock::MockLedStrip::new()),
                buzzer: Arc::new(mock::MockBuzzer::new()),
                scan_injector: Some(reader),
            }
        }
    }
}
