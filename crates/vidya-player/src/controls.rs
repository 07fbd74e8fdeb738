//! Playback control surface - the headless view-model behind the custom
//! control bar
//!
//! Every control is a direct pass-through command to the session; the
//! surface holds no playback state of its own beyond transient UI flags
//! (currently just whether the language menu is open). Rendering always
//! starts from a fresh session snapshot.

use crate::session::MediaSession;
use crate::timecode;
use crate::tracks::TrackEntry;
use crate::types::SessionState;

/// User interactions the control bar can issue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    TogglePlay,
    ToggleMute,
    /// Advance to the next playback rate in the ladder
    CycleSpeed,
    SetRate(f64),
    ToggleSubtitles,
    PictureInPicture,
    Fullscreen,
    /// Click on the scrub bar at `click_x` of a track `track_width` wide
    ScrubTo { click_x: f64, track_width: f64 },
    SelectAudioTrack(usize),
    ToggleLanguageMenu,
}

/// Everything the control bar needs to paint one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ControlBarView {
    pub is_playing: bool,
    pub is_muted: bool,
    /// `"current / duration"` clock label
    pub clock_label: String,
    /// Scrub-bar fill fraction in `[0, 1]`
    pub progress: f64,
    /// Speed button label, e.g. `"1.25x"`
    pub rate_label: String,
    pub subtitles_on: bool,
    /// Text on the language pill
    pub language_label: String,
    pub language_menu_open: bool,
    pub audio_menu: Vec<TrackEntry>,
    /// Show the "stream unavailable, retry" affordance
    pub stream_unavailable: bool,
}

/// The control bar's view-model
#[derive(Debug, Default)]
pub struct ControlSurface {
    language_menu_open: bool,
}

impl ControlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language_menu_open(&self) -> bool {
        self.language_menu_open
    }

    /// Dispatch a control interaction to the session
    pub async fn apply(&mut self, action: ControlAction, session: &MediaSession) {
        match action {
            ControlAction::TogglePlay => session.toggle_play().await,
            ControlAction::ToggleMute => session.toggle_mute().await,
            ControlAction::CycleSpeed => session.cycle_playback_rate().await,
            ControlAction::SetRate(rate) => session.set_playback_rate(rate).await,
            ControlAction::ToggleSubtitles => session.toggle_subtitles().await,
            ControlAction::PictureInPicture => session.toggle_picture_in_picture().await,
            ControlAction::Fullscreen => session.request_fullscreen().await,
            ControlAction::ScrubTo { click_x, track_width } => {
                if track_width <= 0.0 {
                    return;
                }
                let Some(duration) = session.snapshot().duration else {
                    return;
                };
                let fraction = (click_x / track_width).clamp(0.0, 1.0);
                session.seek(fraction * duration).await;
            }
            ControlAction::SelectAudioTrack(index) => {
                session.switch_audio_track(index).await;
                self.language_menu_open = false;
            }
            ControlAction::ToggleLanguageMenu => {
                self.language_menu_open = !self.language_menu_open;
            }
        }
    }

    /// Build the render model from the session's published state
    pub async fn view(&self, session: &MediaSession) -> ControlBarView {
        let snapshot = session.snapshot();
        let progress = snapshot
            .duration
            .filter(|d| *d > 0.0)
            .map(|d| (snapshot.current_time / d).clamp(0.0, 1.0))
            .unwrap_or(0.0);

        ControlBarView {
            is_playing: snapshot.is_playing,
            is_muted: snapshot.is_muted,
            clock_label: timecode::format_clock(snapshot.current_time, snapshot.duration),
            progress,
            rate_label: rate_label(snapshot.playback_rate),
            subtitles_on: snapshot.subtitles_visible,
            language_label: session.active_track_label().await,
            language_menu_open: self.language_menu_open,
            audio_menu: session.track_entries().await,
            stream_unavailable: session.state().await == SessionState::Failed,
        }
    }
}

fn rate_label(rate: f64) -> String {
    if (rate - rate.round()).abs() < f64::EPSILON {
        format!("{}x", rate as i64)
    } else {
        format!("{rate}x")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEvent;
    use crate::sim::{SimMedia, SimulatorEngine};
    use crate::types::{MediaSource, SessionConfig};
    use tokio::sync::mpsc;
    use url::Url;

    async fn pump(session: &MediaSession, events: &mut mpsc::UnboundedReceiver<EngineEvent>) {
        while let Ok(event) = events.try_recv() {
            session.handle_event(event).await;
        }
    }

    async fn ready_session() -> (
        MediaSession,
        SimulatorEngine,
        mpsc::UnboundedReceiver<EngineEvent>,
    ) {
        let media = SimMedia {
            duration: 600.0,
            ..SimMedia::default()
        };
        let (engine, mut rx) = SimulatorEngine::new(media);
        let sim = engine.clone();
        let session = MediaSession::new(SessionConfig::default());
        session.initialize(Box::new(engine)).await;
        session
            .load_source(&MediaSource {
                video_uri: Url::parse("https://cdn.example.com/waves/master.m3u8").unwrap(),
                subtitle_uri: Url::parse("https://cdn.example.com/waves/waves_subtitle.vtt")
                    .unwrap(),
                content_id: "waves".to_string(),
            })
            .await
            .unwrap();
        pump(&session, &mut rx).await;
        (session, sim, rx)
    }

    #[test]
    fn test_rate_label() {
        assert_eq!(rate_label(1.0), "1x");
        assert_eq!(rate_label(2.0), "2x");
        assert_eq!(rate_label(0.5), "0.5x");
        assert_eq!(rate_label(1.25), "1.25x");
    }

    #[tokio::test]
    async fn test_scrub_maps_click_to_duration() {
        let (session, _sim, mut rx) = ready_session().await;
        let mut surface = ControlSurface::new();

        surface
            .apply(ControlAction::ScrubTo { click_x: 320.0, track_width: 640.0 }, &session)
            .await;
        pump(&session, &mut rx).await;
        assert_eq!(session.snapshot().current_time, 300.0);

        // Clicks past either edge clamp
        surface
            .apply(ControlAction::ScrubTo { click_x: 900.0, track_width: 640.0 }, &session)
            .await;
        pump(&session, &mut rx).await;
        assert_eq!(session.snapshot().current_time, 600.0);

        surface
            .apply(ControlAction::ScrubTo { click_x: -10.0, track_width: 640.0 }, &session)
            .await;
        pump(&session, &mut rx).await;
        assert_eq!(session.snapshot().current_time, 0.0);
    }

    #[tokio::test]
    async fn test_language_menu_closes_on_selection() {
        let (session, _sim, mut rx) = ready_session().await;
        let mut surface = ControlSurface::new();

        surface.apply(ControlAction::ToggleLanguageMenu, &session).await;
        assert!(surface.language_menu_open());

        surface.apply(ControlAction::SelectAudioTrack(1), &session).await;
        pump(&session, &mut rx).await;
        assert!(!surface.language_menu_open());

        let view = surface.view(&session).await;
        assert_eq!(view.language_label, "Hindi (हिन्दी)");
        assert!(view.audio_menu[1].enabled);
    }

    #[tokio::test]
    async fn test_view_reflects_snapshot() {
        let (session, sim, mut rx) = ready_session().await;
        let surface = ControlSurface::new();

        session.toggle_play().await;
        sim.advance(65.0);
        session.toggle_mute().await;
        pump(&session, &mut rx).await;

        let view = surface.view(&session).await;
        assert!(view.is_playing);
        assert!(view.is_muted);
        assert_eq!(view.clock_label, "1:05 / 10:00");
        assert!((view.progress - 65.0 / 600.0).abs() < 1e-9);
        assert_eq!(view.rate_label, "1x");
        assert!(!view.stream_unavailable);
    }
}
