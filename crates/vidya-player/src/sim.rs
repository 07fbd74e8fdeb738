//! Simulator engine - a headless, scriptable [`MediaEngine`]
//!
//! Renders nothing; instead it models the observable behavior of a real
//! engine (metadata loads, clock advancement, track lists, error latching)
//! and emits [`EngineEvent`]s on a channel for the owner to pump into the
//! session. Used by the demo binary and the scenario tests, and handy for
//! driving lecture playback logic anywhere no real media stack exists.

use crate::engine::{EngineErrorKind, EngineEvent, MediaEngine};
use crate::source::SourceKind;
use crate::tracks::AudioTrack;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

/// Description of the media a [`SimulatorEngine`] pretends to load
#[derive(Debug, Clone)]
pub struct SimMedia {
    /// Content duration in seconds
    pub duration: f64,
    /// Audio renditions as `(label, language)` pairs, in encoding order
    pub audio_tracks: Vec<(String, Option<String>)>,
}

impl Default for SimMedia {
    fn default() -> Self {
        Self {
            duration: 300.0,
            audio_tracks: vec![("audio_1".to_string(), None), ("audio_2".to_string(), None)],
        }
    }
}

#[derive(Debug)]
struct Inner {
    media: SimMedia,
    source: Option<(Url, SourceKind)>,
    loaded: bool,
    position: f64,
    paused: bool,
    muted: bool,
    rate: f64,
    tracks: Vec<AudioTrack>,
    text_tracks: Vec<Url>,
    text_visible: bool,
    error: Option<EngineErrorKind>,
    fail_next_reload: Option<EngineErrorKind>,
    pip_active: bool,
    fullscreen_requests: u32,
}

/// Scriptable in-process playback engine.
///
/// Cloning yields another handle to the same simulated engine, so a test
/// can keep one handle for scripting after boxing the other into a session.
#[derive(Clone)]
pub struct SimulatorEngine {
    inner: Arc<Mutex<Inner>>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl SimulatorEngine {
    /// Create an engine along with the receiver its events arrive on
    pub fn new(media: SimMedia) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let engine = Self {
            inner: Arc::new(Mutex::new(Inner {
                media,
                source: None,
                loaded: false,
                position: 0.0,
                paused: true,
                muted: false,
                rate: 1.0,
                tracks: Vec::new(),
                text_tracks: Vec::new(),
                text_visible: false,
                error: None,
                fail_next_reload: None,
                pip_active: false,
                fullscreen_requests: 0,
            })),
            events,
        };
        (engine, rx)
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    // --- scripting surface ---

    /// Make the next reload fail with the given error class
    pub fn fail_next_reload(&self, kind: EngineErrorKind) {
        self.inner.lock().unwrap().fail_next_reload = Some(kind);
    }

    /// Latch an error and emit it, as if streaming broke mid-playback
    pub fn emit_error(&self, kind: EngineErrorKind) {
        self.inner.lock().unwrap().error = Some(kind);
        self.emit(EngineEvent::Error(kind));
    }

    /// Advance the playback clock by `dt` seconds of wall time
    pub fn advance(&self, dt: f64) {
        let position = {
            let mut inner = self.inner.lock().unwrap();
            if inner.paused || !inner.loaded {
                return;
            }
            let duration = inner.media.duration;
            inner.position = (inner.position + dt * inner.rate).min(duration);
            inner.position
        };
        self.emit(EngineEvent::TimeUpdate(position));
    }

    // --- inspection for assertions ---

    pub fn current_position(&self) -> f64 {
        self.inner.lock().unwrap().position
    }

    pub fn text_track_count(&self) -> usize {
        self.inner.lock().unwrap().text_tracks.len()
    }

    pub fn text_tracks_visible(&self) -> bool {
        self.inner.lock().unwrap().text_visible
    }

    pub fn pip_active(&self) -> bool {
        self.inner.lock().unwrap().pip_active
    }

    pub fn fullscreen_requests(&self) -> u32 {
        self.inner.lock().unwrap().fullscreen_requests
    }

    pub fn assigned_source(&self) -> Option<(Url, SourceKind)> {
        self.inner.lock().unwrap().source.clone()
    }
}

impl MediaEngine for SimulatorEngine {
    fn assign_source(&mut self, uri: &Url, kind: SourceKind) {
        let mut inner = self.inner.lock().unwrap();
        inner.source = Some((uri.clone(), kind));
    }

    fn reload(&mut self) {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            if inner.source.is_none() {
                debug!("reload with no source assigned, ignoring");
                return;
            }
            if let Some(kind) = inner.fail_next_reload.take() {
                inner.error = Some(kind);
                inner.loaded = false;
                Err(kind)
            } else {
                inner.error = None;
                inner.loaded = true;
                inner.position = 0.0;
                inner.paused = true;
                inner.tracks = inner
                    .media
                    .audio_tracks
                    .iter()
                    .enumerate()
                    .map(|(index, (label, language))| AudioTrack {
                        index,
                        label: label.clone(),
                        language: language.clone(),
                        enabled: index == 0,
                    })
                    .collect();
                Ok(inner.media.duration)
            }
        };
        match outcome {
            Ok(duration) => {
                self.emit(EngineEvent::MetadataLoaded { duration });
                self.emit(EngineEvent::AudioTracksChanged);
            }
            Err(kind) => self.emit(EngineEvent::Error(kind)),
        }
    }

    fn play(&mut self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.error.is_some() || !inner.loaded {
                return;
            }
            inner.paused = false;
        }
        self.emit(EngineEvent::Play);
    }

    fn pause(&mut self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.paused {
                return;
            }
            inner.paused = true;
        }
        self.emit(EngineEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    fn position(&self) -> f64 {
        self.inner.lock().unwrap().position
    }

    fn set_position(&mut self, seconds: f64) {
        let position = {
            let mut inner = self.inner.lock().unwrap();
            let max = if inner.loaded { inner.media.duration } else { 0.0 };
            inner.position = seconds.clamp(0.0, max);
            inner.position
        };
        self.emit(EngineEvent::TimeUpdate(position));
    }

    fn duration(&self) -> Option<f64> {
        let inner = self.inner.lock().unwrap();
        inner.loaded.then_some(inner.media.duration)
    }

    fn is_muted(&self) -> bool {
        self.inner.lock().unwrap().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.inner.lock().unwrap().muted = muted;
        self.emit(EngineEvent::VolumeChange { muted });
    }

    fn playback_rate(&self) -> f64 {
        self.inner.lock().unwrap().rate
    }

    fn set_rate(&mut self, rate: f64) {
        self.inner.lock().unwrap().rate = rate;
        self.emit(EngineEvent::RateChange(rate));
    }

    fn audio_tracks(&self) -> Vec<AudioTrack> {
        self.inner.lock().unwrap().tracks.clone()
    }

    fn set_audio_track_enabled(&mut self, index: usize, enabled: bool) {
        let changed = {
            let mut inner = self.inner.lock().unwrap();
            match inner.tracks.get_mut(index) {
                Some(track) if track.enabled != enabled => {
                    track.enabled = enabled;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.emit(EngineEvent::AudioTracksChanged);
        }
    }

    fn attach_text_track(&mut self, uri: &Url) {
        self.inner.lock().unwrap().text_tracks.push(uri.clone());
    }

    fn clear_text_tracks(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.text_tracks.clear();
        inner.text_visible = false;
    }

    fn set_text_tracks_visible(&mut self, visible: bool) {
        self.inner.lock().unwrap().text_visible = visible;
    }

    fn toggle_picture_in_picture(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.pip_active = !inner.pip_active;
    }

    fn request_fullscreen(&mut self) {
        self.inner.lock().unwrap().fullscreen_requests += 1;
    }

    fn clear_error(&mut self) {
        self.inner.lock().unwrap().error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_uri() -> Url {
        Url::parse("https://cdn.example.com/waves/master.m3u8").unwrap()
    }

    #[test]
    fn test_reload_publishes_metadata() {
        let (mut engine, mut rx) = SimulatorEngine::new(SimMedia::default());
        engine.assign_source(&manifest_uri(), SourceKind::AdaptiveManifest);
        engine.reload();

        assert_eq!(rx.try_recv().unwrap(), EngineEvent::MetadataLoaded { duration: 300.0 });
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::AudioTracksChanged);
        assert_eq!(engine.duration(), Some(300.0));
        assert_eq!(engine.audio_tracks().len(), 2);
        assert!(engine.audio_tracks()[0].enabled);
    }

    #[test]
    fn test_reload_without_source_is_inert() {
        let (mut engine, mut rx) = SimulatorEngine::new(SimMedia::default());
        engine.reload();
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.duration(), None);
    }

    #[test]
    fn test_scripted_load_failure() {
        let (mut engine, mut rx) = SimulatorEngine::new(SimMedia::default());
        engine.fail_next_reload(EngineErrorKind::SourceUnavailable);
        engine.assign_source(&manifest_uri(), SourceKind::AdaptiveManifest);
        engine.reload();

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::Error(EngineErrorKind::SourceUnavailable)
        );
        // A latched error blocks playback until cleared
        engine.play();
        assert!(engine.is_paused());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_clock_advances_with_rate() {
        let (mut engine, _rx) = SimulatorEngine::new(SimMedia::default());
        engine.assign_source(&manifest_uri(), SourceKind::AdaptiveManifest);
        engine.reload();
        engine.play();
        engine.set_rate(2.0);

        let handle = engine.clone();
        handle.advance(10.0);
        assert_eq!(engine.position(), 20.0);

        // Clamped at content end
        handle.advance(1e6);
        assert_eq!(engine.position(), 300.0);
    }
}
