//! Database access layer
//!
//! SQLite-backed persistent store: media catalog, tag mappings, playback
//! log, and the settings key-value table. Each table gets its own module of
//! async query functions over a shared `Pool<Sqlite>`.

pub mod init;
pub mod log;
pub mod media;
pub mod settings;
pub mod tags;

pub use init::{connect, init_schema};
