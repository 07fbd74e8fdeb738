//! Headless lecture playback demo
//!
//! Drives a full session lifecycle against the simulator engine: resolve a
//! lecture, load it, pick a language, follow the transcript, and recover
//! from a mid-playback network error.
//!
//! Run with: cargo run -p vidya-player --example headless_playback

use anyhow::Result;
use tokio::sync::mpsc;
use url::Url;
use vidya_player::{
    EngineErrorKind, EngineEvent, MediaSession, SessionConfig, SimMedia, SimulatorEngine,
    SourceResolver, SyncAction, TranscriptSegment, TranscriptSync,
};

async fn pump(session: &MediaSession, events: &mut mpsc::UnboundedReceiver<EngineEvent>) {
    while let Ok(event) = events.try_recv() {
        session.handle_event(event).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    vidya_player::init();

    let resolver = SourceResolver::new(
        Url::parse("https://cdn.example.com/")?,
        "media/lectures",
    );
    let source = resolver.resolve("waves")?;
    println!("Lecture 'waves'");
    println!("  video:     {}", source.video_uri);
    println!("  subtitles: {}\n", source.subtitle_uri);

    let media = SimMedia {
        duration: 480.0,
        audio_tracks: vec![
            ("audio_1".to_string(), None),
            ("audio_2".to_string(), None),
            ("audio_3".to_string(), None),
        ],
    };
    let (engine, mut events) = SimulatorEngine::new(media);
    let sim = engine.clone();

    let session = MediaSession::new(SessionConfig::default());
    session.initialize(Box::new(engine)).await;
    session.load_source(&source).await?;
    session.attach_subtitles(&source.subtitle_uri).await;
    pump(&session, &mut events).await;

    println!("state: {}", session.state().await);
    println!("audio: {}", session.active_track_label().await);
    for entry in session.track_entries().await {
        let marker = if entry.enabled { "*" } else { " " };
        println!("  [{marker}] {} {}", entry.index, entry.display_label);
    }

    session.switch_audio_track(1).await;
    pump(&session, &mut events).await;
    println!("\nswitched audio: {}\n", session.active_track_label().await);

    let mut transcript = TranscriptSync::new(vec![
        TranscriptSegment { start_time: 0.0, text: "What is a wave?".into() },
        TranscriptSegment { start_time: 42.0, text: "Transverse vs longitudinal".into() },
        TranscriptSegment { start_time: 130.0, text: "The wave equation".into() },
    ]);

    session.seek_timecode("01:05").await;
    pump(&session, &mut events).await;
    let snapshot = session.snapshot();
    println!("after seek_timecode(\"01:05\"): t={} playing={}", snapshot.current_time, snapshot.is_playing);
    if let Some(SyncAction::ScrollTo(index)) = transcript.update(snapshot.current_time) {
        println!("transcript scrolls to: {:?}", transcript.segments()[index].text);
    }

    // Simulate the stream dropping mid-lecture
    sim.emit_error(EngineErrorKind::Network);
    pump(&session, &mut events).await;
    let snapshot = session.snapshot();
    println!(
        "\nafter network error + recovery: state={} t={} playing={}",
        session.state().await,
        snapshot.current_time,
        snapshot.is_playing
    );

    session.dispose().await;
    println!("\nstate: {}", session.state().await);
    Ok(())
}
