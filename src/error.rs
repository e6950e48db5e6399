//! Error types for tagbox
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the tagbox crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or parsing errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Playback engine errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Hardware port errors
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the tagbox Error
pub type Result<T> = std::result::Result<T, Error>;
