//! # TagBox
//!
//! Playback controller for a tag-driven media appliance: a physical token
//! placed on the reader selects a media item, subject to a daily
//! video-viewing budget, and drives playback plus light/sound feedback.
//!
//! The core is the [`controller::Controller`] state machine, which serializes
//! tag scans, button presses, and playback-completion callbacks into a single
//! consistent session, and the pure limit evaluator in [`limits`]. Hardware
//! (tag reader, LEDs, buzzer, buttons) and the playback engine are consumed
//! through the capability traits in [`hardware`] and [`player`].

pub mod api;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod events;
pub mod hardware;
pub mod limits;
pub mod models;
pub mod player;
pub mod poll;

pub use error::{Error, Result};
