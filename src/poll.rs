//! Hardware polling loops
//!
//! Two repeating tokio tasks drive the controller: one polling the tag
//! reader, one polling the buttons. Polls are non-blocking by contract, so
//! each loop only ever sleeps on its own interval. Both stop promptly when
//! the shutdown watch channel fires and are joined before hardware teardown.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::Config;
use crate::controller::Controller;
use crate::hardware::{ButtonAction, Buttons, TagReader};

/// Spawn the tag-polling task.
pub fn spawn_tag_loop(
    reader: Arc<dyn TagReader>,
    controller: Arc<Controller>,
    config: &Config,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut ticker = tokio::time::interval(config.tag_poll_interval);
    tokio::spawn(async move {
        info!("Tag polling task started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(uid) = reader.poll_uid() {
                        if let Err(e) = controller.on_tag_scanned(&uid).await {
                            error!("Error handling tag scan: {}", e);
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("Tag polling task stopping");
                    break;
                }
            }
        }
    })
}

/// Spawn the button-polling task.
pub fn spawn_button_loop(
    buttons: Arc<dyn Buttons>,
    controller: Arc<Controller>,
    config: &Config,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut ticker = tokio::time::interval(config.button_poll_interval);
    tokio::spawn(async move {
        info!("Button polling task started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match buttons.poll() {
                        Some(ButtonAction::PlayPause) => controller.on_play_pause().await,
                        Some(ButtonAction::Stop) => {
                            if let Err(e) = controller.on_stop().await {
                                error!("Error handling stop button: {}", e);
                            }
                        }
                        None => {}
                    }
                }
                _ = shutdown.changed() => {
                    info!("Button polling task stopping");
                    break;
                }
            }
        }
    })
}
