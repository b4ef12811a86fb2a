//! # Playback Error Types
//!
//! Error types for the audio cache and the queue controller.
//!
//! Nothing here is fatal to the player: controller commands swallow invalid
//! input, and cache failures only reach the holder of the pending handle.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback and caching operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Track has no media URL and cannot be played or cached.
    #[error("Track has no media URL: {0}")]
    MissingUrl(String),

    /// Remote source could not be opened.
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    /// Byte stream broke off while downloading.
    #[error("Streaming failed: {0}")]
    StreamingFailed(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The media engine rejected a command.
    #[error("Media engine error: {0}")]
    Engine(String),

    /// Attempted operation when the queue is empty.
    #[error("No track loaded")]
    NoTrackLoaded,

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Cache directory or file operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// The cache worker has shut down and no longer accepts jobs.
    #[error("Cache worker stopped")]
    WorkerStopped,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Host bridge failure not covered above.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::StreamingFailed(_) | PlaybackError::SourceUnavailable(_) => true,
            PlaybackError::Bridge(e) => e.is_network_error(),
            _ => false,
        }
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        match self {
            PlaybackError::StreamingFailed(_) | PlaybackError::SourceUnavailable(_) => true,
            PlaybackError::Bridge(e) => e.is_network_error(),
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
