//! Media session - the single authoritative wrapper around one playback
//! engine instance per mounted lecture view
//!
//! Coordinates:
//! - Source assignment and subtitle attachment
//! - Audio-track selection (the exactly-one-enabled invariant)
//! - The shared timestamp-seek contract used by transcript and chat
//! - Network-error recovery that preserves the viewer's position
//! - State fan-out to passive observers (control bar, transcript list)

use crate::{
    engine::{EngineErrorKind, EngineEvent, MediaEngine},
    error::{Error, Result},
    source::SourceKind,
    timecode,
    tracks::{self, TrackEntry},
    types::{MediaSource, PlaybackState, SessionConfig, SessionId, SessionState},
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Ephemeral bookkeeping held only while an error-recovery attempt is in
/// flight. Doubles as the one-shot "resume once metadata loads" listener:
/// it is consumed on first fire and cleared on dispose or source change.
#[derive(Debug, Clone, Copy)]
struct RecoveryContext {
    last_known_time: f64,
    attempts: u32,
}

/// Typed events published by the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged { from: SessionState, to: SessionState },
    TimeUpdate(f64),
    RateChanged(f64),
    TracksChanged(Vec<TrackEntry>),
    SourceChanged { content_id: String },
    SubtitlesToggled(bool),
    RecoveryStarted { at: f64 },
    RecoveryCompleted { at: f64 },
    /// Recovery (or a load) failed; show the "stream unavailable" affordance
    PlaybackUnavailable,
    Disposed,
}

/// Media session managing a single mounted lecture view.
///
/// Sole owner and mutator of [`PlaybackState`] and the audio-track
/// enablement flags; observers read snapshots and issue commands back
/// through this type, which is what makes the model lock-free for them.
pub struct MediaSession {
    /// Unique session ID
    id: SessionId,
    /// Session configuration
    config: SessionConfig,
    /// The wrapped engine; `None` until initialize and after dispose
    engine: Arc<RwLock<Option<Box<dyn MediaEngine>>>>,
    /// Current machine state
    state: Arc<RwLock<SessionState>>,
    /// State change broadcaster
    state_tx: watch::Sender<SessionState>,
    /// Playback snapshot broadcaster (also the snapshot store)
    playback_tx: watch::Sender<PlaybackState>,
    /// Source for the current lecture
    source: Arc<RwLock<Option<MediaSource>>>,
    /// Audio-track listing for the language menu
    track_entries: Arc<RwLock<Vec<TrackEntry>>>,
    /// In-flight recovery bookkeeping
    recovery: Arc<RwLock<Option<RecoveryContext>>>,
    /// Typed event fan-out
    events_tx: broadcast::Sender<SessionEvent>,
}

impl MediaSession {
    /// Create a new session; the engine is installed separately via
    /// [`initialize`](Self::initialize)
    pub fn new(config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (playback_tx, _) = watch::channel(PlaybackState::default());
        let (events_tx, _) = broadcast::channel(64);

        Self {
            id: SessionId::new(),
            config,
            engine: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(SessionState::Idle)),
            state_tx,
            playback_tx,
            source: Arc::new(RwLock::new(None)),
            track_entries: Arc::new(RwLock::new(Vec::new())),
            recovery: Arc::new(RwLock::new(None)),
            events_tx,
        }
    }

    /// Get session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Get current machine state
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Current playback snapshot
    pub fn snapshot(&self) -> PlaybackState {
        self.playback_tx.borrow().clone()
    }

    /// Subscribe to machine state changes
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to playback snapshots (time, rate, mute, subtitles)
    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackState> {
        self.playback_tx.subscribe()
    }

    /// Subscribe to the typed event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Audio-track listing contract for the language menu
    pub async fn track_entries(&self) -> Vec<TrackEntry> {
        self.track_entries.read().await.clone()
    }

    /// Display label of the currently enabled audio track
    pub async fn active_track_label(&self) -> String {
        self.with_engine(|e| tracks::active_label(&e.audio_tracks()))
            .await
            .unwrap_or_else(|| "Default".to_string())
    }

    /// Transition to new state
    async fn set_state(&self, new_state: SessionState) -> Result<()> {
        let current = *self.state.read().await;
        if current == new_state {
            return Ok(());
        }
        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        *self.state.write().await = new_state;
        let _ = self.state_tx.send(new_state);
        let _ = self.events_tx.send(SessionEvent::StateChanged {
            from: current,
            to: new_state,
        });

        info!(from = %current, to = %new_state, "session state");
        Ok(())
    }

    async fn with_engine<R>(&self, f: impl FnOnce(&mut dyn MediaEngine) -> R) -> Option<R> {
        let mut guard = self.engine.write().await;
        match guard.as_deref_mut() {
            Some(engine) => Some(f(engine)),
            None => None,
        }
    }

    async fn is_disposed(&self) -> bool {
        self.state().await == SessionState::Disposed
    }

    /// Install the playback engine. Exactly once per mounted instance; a
    /// second call while already initialized is a no-op.
    pub async fn initialize(&self, engine: Box<dyn MediaEngine>) {
        if self.is_disposed().await {
            warn!(session_id = %self.id, "initialize after dispose, ignoring");
            return;
        }
        let mut slot = self.engine.write().await;
        if slot.is_some() {
            debug!(session_id = %self.id, "engine already installed");
            return;
        }
        *slot = Some(engine);
        info!(session_id = %self.id, "engine installed");
    }

    /// Assign and load a media source.
    ///
    /// Clears any latched engine error first, then triggers a fresh load.
    /// Called on first mount and again whenever the lecture identifier
    /// changes; the previous source is replaced wholesale.
    #[instrument(skip(self, source), fields(content_id = %source.content_id))]
    pub async fn load_source(&self, source: &MediaSource) -> Result<()> {
        if self.is_disposed().await {
            return Err(Error::Disposed);
        }
        {
            let mut guard = self.engine.write().await;
            let engine = guard.as_deref_mut().ok_or(Error::EngineNotReady)?;
            let kind = SourceKind::from_uri(&source.video_uri);
            engine.clear_error();
            engine.assign_source(&source.video_uri, kind);
            engine.reload();
            info!(uri = %source.video_uri, kind = %kind, "source assigned");
        }

        // A source change invalidates any in-flight recovery
        *self.recovery.write().await = None;
        *self.source.write().await = Some(source.clone());
        self.playback_tx.send_modify(|p| {
            p.current_time = 0.0;
            p.duration = None;
            p.is_playing = false;
        });
        self.set_state(SessionState::Loading).await?;
        let _ = self.events_tx.send(SessionEvent::SourceChanged {
            content_id: source.content_id.clone(),
        });
        Ok(())
    }

    /// Attach a subtitle text track, replacing any previously attached
    /// tracks so a source change never leaves stale subtitles behind.
    ///
    /// The new track starts hidden; visibility only changes through
    /// [`toggle_subtitles`](Self::toggle_subtitles).
    pub async fn attach_subtitles(&self, uri: &Url) {
        if self.is_disposed().await {
            return;
        }
        let attached = self
            .with_engine(|e| {
                e.clear_text_tracks();
                e.attach_text_track(uri);
            })
            .await;
        if attached.is_some() {
            self.playback_tx.send_modify(|p| p.subtitles_visible = false);
            debug!(uri = %uri, "subtitle track attached");
        }
    }

    /// Enable the audio track at `index` and disable every other one.
    ///
    /// This is the only mutation path for track enablement, which is what
    /// maintains the exactly-one-enabled invariant. An out-of-range index
    /// is a no-op and the previous selection is preserved.
    pub async fn switch_audio_track(&self, index: usize) {
        if self.is_disposed().await {
            return;
        }
        let switched = self
            .with_engine(|e| {
                let count = e.audio_tracks().len();
                if index >= count {
                    debug!(index, tracks = count, "audio track out of range, keeping current");
                    return false;
                }
                for i in 0..count {
                    e.set_audio_track_enabled(i, i == index);
                }
                true
            })
            .await
            .unwrap_or(false);
        if switched {
            info!(index, "audio track switched");
            self.refresh_tracks().await;
        }
    }

    /// Seek to a position in seconds, clamped to `[0, duration]`, and
    /// resume playback - the play-after-seek half of the seek contract.
    #[instrument(skip(self))]
    pub async fn seek(&self, seconds: f64) {
        if !seconds.is_finite() || self.is_disposed().await {
            return;
        }
        let autoplay = self.config.autoplay_after_seek;
        let applied = self
            .with_engine(|e| {
                let clamped = match e.duration() {
                    Some(duration) => seconds.clamp(0.0, duration),
                    None => seconds.max(0.0),
                };
                e.set_position(clamped);
                if autoplay {
                    e.play();
                }
                clamped
            })
            .await;
        if let Some(position) = applied {
            self.playback_tx.send_modify(|p| p.current_time = position);
            debug!(to = position, "seek applied");
        }
    }

    /// The shared seek contract consumed by transcript and chat
    /// collaborators: accepts a `MM:SS` / `HH:MM:SS` string; malformed
    /// input is a silent no-op.
    pub async fn seek_timecode(&self, text: &str) {
        match timecode::parse(text) {
            Some(seconds) => self.seek(seconds).await,
            None => debug!(input = text, "unparseable timecode, seek ignored"),
        }
    }

    /// Toggle between play and pause; a no-op until the engine is ready
    pub async fn toggle_play(&self) {
        if self.is_disposed().await {
            return;
        }
        self.with_engine(|e| {
            if e.is_paused() {
                e.play();
            } else {
                e.pause();
            }
        })
        .await;
    }

    /// Toggle audio mute
    pub async fn toggle_mute(&self) {
        if self.is_disposed().await {
            return;
        }
        if let Some(muted) = self
            .with_engine(|e| {
                let muted = !e.is_muted();
                e.set_muted(muted);
                muted
            })
            .await
        {
            self.playback_tx.send_modify(|p| p.is_muted = muted);
        }
    }

    /// Set the playback rate; requests outside the configured ladder are
    /// ignored
    pub async fn set_playback_rate(&self, rate: f64) {
        if self.is_disposed().await {
            return;
        }
        if !self.config.playback_rates.iter().any(|r| (r - rate).abs() < 1e-9) {
            warn!(rate, "rate outside the configured ladder, ignoring");
            return;
        }
        if self.with_engine(|e| e.set_rate(rate)).await.is_some() {
            self.playback_tx.send_modify(|p| p.playback_rate = rate);
        }
    }

    /// Advance to the next rate in the ladder, wrapping at the end
    pub async fn cycle_playback_rate(&self) {
        let rates = &self.config.playback_rates;
        if rates.is_empty() {
            return;
        }
        let current = self.snapshot().playback_rate;
        let next = match rates.iter().position(|r| (r - current).abs() < 1e-9) {
            Some(i) => rates[(i + 1) % rates.len()],
            None => rates[0],
        };
        self.set_playback_rate(next).await;
    }

    /// Toggle subtitle visibility on the attached text tracks
    pub async fn toggle_subtitles(&self) {
        if self.is_disposed().await {
            return;
        }
        let visible = !self.snapshot().subtitles_visible;
        if self
            .with_engine(|e| e.set_text_tracks_visible(visible))
            .await
            .is_some()
        {
            self.playback_tx.send_modify(|p| p.subtitles_visible = visible);
            let _ = self.events_tx.send(SessionEvent::SubtitlesToggled(visible));
        }
    }

    /// Toggle picture-in-picture; a no-op until the engine is ready
    pub async fn toggle_picture_in_picture(&self) {
        if self.is_disposed().await {
            return;
        }
        self.with_engine(|e| e.toggle_picture_in_picture()).await;
    }

    /// Request fullscreen; a no-op until the engine is ready
    pub async fn request_fullscreen(&self) {
        if self.is_disposed().await {
            return;
        }
        self.with_engine(|e| e.request_fullscreen()).await;
    }

    /// Tear the session down: cancel any pending one-shot resume, release
    /// the engine, and move to the terminal state. Idempotent; must run on
    /// every exit path of the owning view. No deferred callback is ever
    /// applied after this returns.
    #[instrument(skip(self))]
    pub async fn dispose(&self) {
        if self.is_disposed().await {
            return;
        }
        *self.recovery.write().await = None;
        *self.engine.write().await = None;
        *self.state.write().await = SessionState::Disposed;
        let _ = self.state_tx.send(SessionState::Disposed);
        let _ = self.events_tx.send(SessionEvent::Disposed);
        info!(session_id = %self.id, "session disposed");
    }

    /// The single event-pump entry: the host delivers engine events here
    /// in emission order. Events arriving after dispose are dropped.
    pub async fn handle_event(&self, event: EngineEvent) {
        if self.is_disposed().await {
            debug!(?event, "event after dispose, ignoring");
            return;
        }
        match event {
            EngineEvent::Play => {
                self.playback_tx.send_modify(|p| p.is_playing = true);
                let _ = self.set_state(SessionState::Playing).await;
            }
            EngineEvent::Pause => {
                self.playback_tx.send_modify(|p| p.is_playing = false);
                let _ = self.set_state(SessionState::Paused).await;
            }
            EngineEvent::TimeUpdate(position) => {
                self.playback_tx.send_modify(|p| p.current_time = position);
                let _ = self.events_tx.send(SessionEvent::TimeUpdate(position));
            }
            EngineEvent::VolumeChange { muted } => {
                self.playback_tx.send_modify(|p| p.is_muted = muted);
            }
            EngineEvent::RateChange(rate) => {
                self.playback_tx.send_modify(|p| p.playback_rate = rate);
                let _ = self.events_tx.send(SessionEvent::RateChanged(rate));
            }
            EngineEvent::MetadataLoaded { duration } => {
                self.on_metadata_loaded(duration).await;
            }
            EngineEvent::AudioTracksChanged => {
                self.refresh_tracks().await;
            }
            EngineEvent::Error(kind) => {
                self.on_engine_error(kind).await;
            }
        }
    }

    async fn refresh_tracks(&self) {
        let Some(listing) = self.with_engine(|e| tracks::listing(&e.audio_tracks())).await else {
            return;
        };
        let changed = {
            let mut entries = self.track_entries.write().await;
            if *entries == listing {
                false
            } else {
                *entries = listing.clone();
                true
            }
        };
        if changed {
            let _ = self.events_tx.send(SessionEvent::TracksChanged(listing));
        }
    }

    async fn on_metadata_loaded(&self, duration: f64) {
        self.playback_tx.send_modify(|p| p.duration = Some(duration));
        let state = self.state().await;
        if matches!(state, SessionState::Loading | SessionState::ErrorRecovering) {
            let _ = self.set_state(SessionState::Ready).await;
        }
        self.refresh_tracks().await;

        // One-shot resume-at-position: consumed on its first firing so it
        // cannot leak into subsequent loads.
        let resume = self.recovery.write().await.take();
        if let Some(context) = resume {
            info!(at = context.last_known_time, "recovery reload complete, resuming");
            self.seek(context.last_known_time).await;
            let _ = self.events_tx.send(SessionEvent::RecoveryCompleted {
                at: context.last_known_time,
            });
        }
    }

    async fn source_uri_string(&self) -> String {
        self.source
            .read()
            .await
            .as_ref()
            .map(|s| s.video_uri.to_string())
            .unwrap_or_else(|| "<unassigned>".to_string())
    }

    async fn on_engine_error(&self, kind: EngineErrorKind) {
        if kind != EngineErrorKind::Network {
            let error = Error::from_engine(kind, self.source_uri_string().await);
            self.fail(error).await;
            return;
        }

        let attempt = {
            let mut recovery = self.recovery.write().await;
            match recovery.as_mut() {
                None => {
                    // The position must be captured before the engine is
                    // touched again, or it is lost to the error itself.
                    let last = self.with_engine(|e| e.position()).await.unwrap_or(0.0);
                    *recovery = Some(RecoveryContext {
                        last_known_time: last,
                        attempts: 1,
                    });
                    Some(last)
                }
                Some(context) if context.attempts < self.config.max_recovery_attempts => {
                    context.attempts += 1;
                    Some(context.last_known_time)
                }
                Some(_) => None,
            }
        };

        let Some(position) = attempt else {
            let error = Error::from_engine(kind, self.source_uri_string().await);
            self.fail(error).await;
            return;
        };

        warn!(position, "network error detected, attempting silent recovery");
        let _ = self.set_state(SessionState::ErrorRecovering).await;
        let _ = self.events_tx.send(SessionEvent::RecoveryStarted { at: position });

        let source = self.source.read().await.clone();
        match source {
            Some(source) => {
                // Reassigning the same URI forces a fresh connection
                self.with_engine(|e| {
                    e.clear_error();
                    e.assign_source(&source.video_uri, SourceKind::from_uri(&source.video_uri));
                    e.reload();
                })
                .await;
            }
            None => {
                self.fail(Error::Network("no source to recover".to_string())).await;
            }
        }
    }

    async fn fail(&self, error: Error) {
        warn!(code = error.error_code(), %error, "playback unavailable");
        *self.recovery.write().await = None;
        let _ = self.set_state(SessionState::Failed).await;
        let _ = self.events_tx.send(SessionEvent::PlaybackUnavailable);
    }
}
