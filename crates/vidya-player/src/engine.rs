//! Playback engine seam
//!
//! The session never talks to a concrete media stack directly; it drives a
//! [`MediaEngine`] trait object. Commands are fire-and-forget - completion
//! is observed through [`EngineEvent`]s the host delivers back to the
//! session in emission order, not through blocking return values.

use crate::source::SourceKind;
use crate::tracks::AudioTrack;
use serde::{Deserialize, Serialize};
use url::Url;

/// Error classes reported by a playback engine.
///
/// Only the network class is auto-recoverable; everything else surfaces a
/// retry-prompt state with no automatic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineErrorKind {
    /// Transient connection failure while streaming
    Network,
    /// Source could not be loaded at all (e.g. missing manifest)
    SourceUnavailable,
    /// Media data was fetched but could not be decoded
    Decode,
    /// Anything the engine reports outside the known classes
    Other,
}

impl EngineErrorKind {
    /// Map a numeric media-error code to an error class.
    ///
    /// Follows the HTML media element numbering: 2 is a network error,
    /// 3 a decode error, 4 an unsupported/unreachable source.
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => EngineErrorKind::Network,
            3 => EngineErrorKind::Decode,
            4 => EngineErrorKind::SourceUnavailable,
            _ => EngineErrorKind::Other,
        }
    }
}

/// Events a playback engine emits while running.
///
/// The host event system delivers these in emission order; the session does
/// not impose additional ordering of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Play,
    Pause,
    TimeUpdate(f64),
    VolumeChange { muted: bool },
    RateChange(f64),
    MetadataLoaded { duration: f64 },
    AudioTracksChanged,
    Error(EngineErrorKind),
}

/// Abstraction over one playback engine instance.
///
/// Implementations wrap whatever actually renders media (a browser media
/// element, a native pipeline, or the in-process simulator). All commands
/// must be safe to call before metadata has loaded.
pub trait MediaEngine: Send {
    /// Assign a video source; takes effect on the next [`reload`](Self::reload)
    fn assign_source(&mut self, uri: &Url, kind: SourceKind);
    /// (Re)load the assigned source, forcing a fresh connection
    fn reload(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn position(&self) -> f64;
    fn set_position(&mut self, seconds: f64);
    /// Content duration, known once metadata has loaded
    fn duration(&self) -> Option<f64>;

    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_rate(&mut self, rate: f64);

    /// Snapshot of the source's audio renditions (empty before metadata)
    fn audio_tracks(&self) -> Vec<AudioTrack>;
    fn set_audio_track_enabled(&mut self, index: usize, enabled: bool);

    /// Attach a subtitle text track; the track starts hidden
    fn attach_text_track(&mut self, uri: &Url);
    /// Remove every attached text track
    fn clear_text_tracks(&mut self);
    fn set_text_tracks_visible(&mut self, visible: bool);

    fn toggle_picture_in_picture(&mut self);
    fn request_fullscreen(&mut self);

    /// Clear a latched error so a fresh load can proceed
    fn clear_error(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_from_code() {
        assert_eq!(EngineErrorKind::from_code(2), EngineErrorKind::Network);
        assert_eq!(EngineErrorKind::from_code(3), EngineErrorKind::Decode);
        assert_eq!(EngineErrorKind::from_code(4), EngineErrorKind::SourceUnavailable);
        assert_eq!(EngineErrorKind::from_code(0), EngineErrorKind::Other);
        assert_eq!(EngineErrorKind::from_code(99), EngineErrorKind::Other);
    }
}
