//! Error types for the Vidya playback core

use crate::engine::EngineErrorKind;
use thiserror::Error;

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Playback error types
#[derive(Error, Debug)]
pub enum Error {
    // Streaming errors
    #[error("network error while streaming: {0}")]
    Network(String),

    #[error("source unavailable: {uri}")]
    SourceUnavailable { uri: String },

    #[error("media decode failed: {0}")]
    Decode(String),

    #[error("playback failed: {0}")]
    Playback(String),

    // Session errors
    #[error("invalid session state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("playback engine not installed; call initialize() first")]
    EngineNotReady,

    #[error("session already disposed")]
    Disposed,

    // Configuration errors
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid media URI: {0}")]
    InvalidUri(#[from] url::ParseError),
}

impl Error {
    /// Translate an engine-reported error class at the session boundary
    pub fn from_engine(kind: EngineErrorKind, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        match kind {
            EngineErrorKind::Network => Error::Network(format!("stream interrupted: {uri}")),
            EngineErrorKind::SourceUnavailable => Error::SourceUnavailable { uri },
            EngineErrorKind::Decode => Error::Decode(format!("undecodable media: {uri}")),
            EngineErrorKind::Other => Error::Playback(format!("unclassified engine error: {uri}")),
        }
    }

    /// Returns true if this error is recoverable by an automatic retry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Returns a stable code for log and event payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Network(_) => "NETWORK",
            Error::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            Error::Decode(_) => "DECODE",
            Error::Playback(_) => "PLAYBACK",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::EngineNotReady => "ENGINE_NOT_READY",
            Error::Disposed => "DISPOSED",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidUri(_) => "INVALID_URI",
        }
    }
}
