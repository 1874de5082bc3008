//! # Playback Error Types
//!
//! Errors surfaced by catalog loading, persistence, configuration, and the
//! host audio element.
//!
//! Policy rejections (playing an unplayable track offline, starting a download
//! that is already running, unknown track ids) are not errors: those calls
//! return an outcome value and leave state untouched.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur in the playback core.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Catalog Errors
    // ========================================================================
    /// Catalog data is inconsistent (e.g. duplicate ids).
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// The key-value store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The host audio element refused to load or play a track.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::Storage(_) | PlaybackError::Transport(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
