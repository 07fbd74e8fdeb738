//! Core types for the Vidya playback session

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media source for one lecture.
///
/// Immutable per lecture; a lecture switch replaces the whole value and
/// triggers a fresh load, it never mutates an existing source in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Adaptive manifest or direct file URI for the video
    pub video_uri: Url,
    /// WebVTT subtitle URI derived from the same lecture
    pub subtitle_uri: Url,
    /// Lecture identifier this source was resolved from
    pub content_id: String,
}

/// Snapshot of playback state published by the session.
///
/// Owned exclusively by the session; observers read snapshots and issue
/// commands back through the session, they never mutate this directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Current position in seconds
    pub current_time: f64,
    /// Content duration, known once metadata has loaded
    pub duration: Option<f64>,
    /// Playback is active
    pub is_playing: bool,
    /// Audio is muted
    pub is_muted: bool,
    /// Current playback rate
    pub playback_rate: f64,
    /// Subtitle text tracks are showing
    pub subtitles_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            is_playing: false,
            is_muted: false,
            playback_rate: 1.0,
            subtitles_visible: false,
        }
    }
}

/// Session state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Initial state, no content loaded
    Idle,
    /// Source assigned, waiting for metadata
    Loading,
    /// Metadata loaded, ready to play
    Ready,
    /// Content is playing
    Playing,
    /// Playback paused
    Paused,
    /// Network error detected, silent recovery in flight
    ErrorRecovering,
    /// Load or recovery failed; user must explicitly restart
    Failed,
    /// Session torn down; terminal
    Disposed,
}

impl SessionState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        if target == Disposed {
            return *self != Disposed;
        }
        matches!(
            (self, target),
            // From Idle
            (Idle, Loading) |
            // From Loading
            (Loading, Ready) | (Loading, ErrorRecovering) | (Loading, Failed) |
            // From Ready
            (Ready, Playing) | (Ready, Paused) | (Ready, Loading) | (Ready, ErrorRecovering) | (Ready, Failed) |
            // From Playing
            (Playing, Paused) | (Playing, ErrorRecovering) | (Playing, Loading) | (Playing, Failed) |
            // From Paused
            (Paused, Playing) | (Paused, ErrorRecovering) | (Paused, Loading) | (Paused, Failed) |
            // From ErrorRecovering
            (ErrorRecovering, Ready) | (ErrorRecovering, Loading) | (ErrorRecovering, Failed) |
            // From Failed
            (Failed, Loading)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::ErrorRecovering => write!(f, "error-recovering"),
            SessionState::Failed => write!(f, "failed"),
            SessionState::Disposed => write!(f, "disposed"),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Playback rate ladder offered by the speed control
    pub playback_rates: Vec<f64>,
    /// Automatic reload attempts per network-error occurrence
    pub max_recovery_attempts: u32,
    /// Tolerance in seconds when comparing resumed positions
    pub seek_tolerance: f64,
    /// Resume playback after every seek (the shared seek contract)
    pub autoplay_after_seek: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playback_rates: vec![0.5, 1.0, 1.25, 1.5, 2.0],
            max_recovery_attempts: 1,
            seek_tolerance: 1.0,
            autoplay_after_seek: true,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SessionConfig =
            serde_json::from_str(raw).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants the rest of the session relies on
    pub fn validate(&self) -> Result<()> {
        if self.playback_rates.is_empty() {
            return Err(Error::InvalidConfig("playback_rates must not be empty".into()));
        }
        if self.playback_rates.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(Error::InvalidConfig("playback rates must be positive".into()));
        }
        if !self.seek_tolerance.is_finite() || self.seek_tolerance < 0.0 {
            return Err(Error::InvalidConfig("seek_tolerance must be non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        // The happy path
        assert!(SessionState::Idle.can_transition_to(SessionState::Loading));
        assert!(SessionState::Loading.can_transition_to(SessionState::Ready));
        assert!(SessionState::Ready.can_transition_to(SessionState::Playing));
        assert!(SessionState::Playing.can_transition_to(SessionState::Paused));
        assert!(SessionState::Paused.can_transition_to(SessionState::Playing));

        // Recovery side path
        assert!(SessionState::Playing.can_transition_to(SessionState::ErrorRecovering));
        assert!(SessionState::Paused.can_transition_to(SessionState::ErrorRecovering));
        assert!(SessionState::ErrorRecovering.can_transition_to(SessionState::Ready));
        assert!(SessionState::ErrorRecovering.can_transition_to(SessionState::Failed));

        // Invalid jumps
        assert!(!SessionState::Idle.can_transition_to(SessionState::Playing));
        assert!(!SessionState::Playing.can_transition_to(SessionState::Idle));
        assert!(!SessionState::Failed.can_transition_to(SessionState::Playing));

        // Disposed is terminal and reachable from everywhere else
        assert!(SessionState::Playing.can_transition_to(SessionState::Disposed));
        assert!(SessionState::Failed.can_transition_to(SessionState::Disposed));
        assert!(!SessionState::Disposed.can_transition_to(SessionState::Loading));
        assert!(!SessionState::Disposed.can_transition_to(SessionState::Disposed));
    }

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.playback_rates, vec![0.5, 1.0, 1.25, 1.5, 2.0]);
        assert_eq!(config.max_recovery_attempts, 1);
        assert!(config.autoplay_after_seek);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = SessionConfig::from_json(
            r#"{
                "playback_rates": [1.0, 2.0],
                "max_recovery_attempts": 2,
                "seek_tolerance": 0.5,
                "autoplay_after_seek": false
            }"#,
        )
        .unwrap();
        assert_eq!(config.playback_rates, vec![1.0, 2.0]);
        assert_eq!(config.max_recovery_attempts, 2);
        assert!(!config.autoplay_after_seek);

        assert!(SessionConfig::from_json("{").is_err());
        assert!(SessionConfig::from_json(
            r#"{"playback_rates": [], "max_recovery_attempts": 1, "seek_tolerance": 1.0, "autoplay_after_seek": true}"#
        )
        .is_err());
    }
}
