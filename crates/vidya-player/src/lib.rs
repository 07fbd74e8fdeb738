//! Vidya Player - media playback & synchronization core for lecture views
//!
//! This crate keeps a streamed lecture video, its multi-language audio,
//! its subtitles, and several independent UI surfaces (transcript list,
//! in-lecture chat, quizzes) in lock-step, and survives transient network
//! failures without losing the viewer's place:
//! - Session lifecycle of one playback engine per mounted lecture view
//! - Adaptive-manifest vs. direct-file source loading
//! - Audio-track selection with display-name resolution
//! - Subtitle attachment and explicit visibility toggling
//! - Network-error recovery preserving the playback position
//! - The shared timestamp-seek contract collaborators command seeks through
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Vidya Player Core                     │
//! ├────────────────────────────────────────────────────────────┤
//! │                                                            │
//! │  ┌───────────┐   ┌────────────┐   ┌──────────────┐         │
//! │  │ Timestamp │   │   Track    │   │    Source    │         │
//! │  │   Codec   │   │  Resolver  │   │   Resolver   │         │
//! │  └─────┬─────┘   └─────┬──────┘   └──────┬───────┘         │
//! │        │               │                 │                 │
//! │        └───────────────┼─────────────────┘                 │
//! │                        │                                   │
//! │                 ┌──────┴──────┐      ┌─────────────┐       │
//! │                 │    Media    ├──────┤ MediaEngine │       │
//! │                 │   Session   │      │    (seam)   │       │
//! │                 └──────┬──────┘      └─────────────┘       │
//! │                        │                                   │
//! │     ┌──────────────┐   │   ┌────────────────────┐          │
//! │     │  Transcript  ├───┴───┤  Control Surface   │          │
//! │     │ Synchronizer │       │   (headless bar)   │          │
//! │     └──────────────┘       └────────────────────┘          │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is the single source of truth for playback state; the
//! control surface and transcript synchronizer are passive observers that
//! issue commands back through it. External collaborators (chat, quizzes)
//! seek through the same timestamp contract and never touch the engine.

pub mod controls;
pub mod engine;
pub mod error;
pub mod session;
pub mod sim;
pub mod source;
pub mod timecode;
pub mod tracks;
pub mod transcript;
pub mod types;

pub use controls::{ControlAction, ControlBarView, ControlSurface};
pub use engine::{EngineErrorKind, EngineEvent, MediaEngine};
pub use error::{Error, Result};
pub use session::{MediaSession, SessionEvent};
pub use sim::{SimMedia, SimulatorEngine};
pub use source::{SourceKind, SourceResolver};
pub use tracks::{AudioTrack, TrackEntry};
pub use transcript::{SyncAction, TranscriptSegment, TranscriptSync};
pub use types::{MediaSource, PlaybackState, SessionConfig, SessionId, SessionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the playback library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Vidya player core initialized");
}
