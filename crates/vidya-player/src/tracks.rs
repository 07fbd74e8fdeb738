//! Audio track metadata and display-name resolution
//!
//! Track metadata coming out of the source encodings is inconsistent: some
//! renditions carry ISO language codes, some carry human labels, and some
//! carry only the muxer's positional `audio_N` names (or nothing at all).
//! [`resolve_label`] applies an ordered fallback heuristic so the language
//! menu always shows something a viewer can pick from.

use serde::{Deserialize, Serialize};

/// One audio rendition of the loaded source.
///
/// Across a loaded track list exactly one track is enabled; the session's
/// track-switch operation is the only mutation path for that flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Position of the track within the engine's track list
    pub index: usize,
    /// Raw label reported by the source encoding (may be empty)
    pub label: String,
    /// ISO 639 language code, when the encoding carries one
    pub language: Option<String>,
    /// Whether this track is currently audible
    pub enabled: bool,
}

/// Audio-track listing entry consumed by the language menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub index: usize,
    pub display_label: String,
    pub enabled: bool,
}

/// Known lecture languages, in canonical encoding order.
///
/// The order doubles as the positional fallback: `audio_1` (or an unnamed
/// track at position 0) is English, `audio_2` is Hindi, and so on.
const LANGUAGES: [(&str, &str); 5] = [
    ("eng", "English"),
    ("hin", "Hindi (हिन्दी)"),
    ("mar", "Marathi (मराठी)"),
    ("tam", "Tamil (தமிழ்)"),
    ("tel", "Telugu (తెలుగు)"),
];

/// Resolve a human-readable display name for a track.
///
/// Fallback order: explicit language code, language name embedded in the
/// raw label, positional `audio_N` convention, the raw label verbatim, and
/// finally `"Audio {n}"`.
pub fn resolve_label(track: &AudioTrack, index_in_list: usize) -> String {
    let code = track
        .language
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();
    let label_lower = track.label.to_lowercase();

    for (known_code, display) in LANGUAGES {
        if code == known_code {
            return display.to_string();
        }
    }

    if !label_lower.is_empty() {
        for (_, display) in LANGUAGES {
            let name = display.split(' ').next().unwrap_or(display).to_lowercase();
            if label_lower.contains(&name) {
                return display.to_string();
            }
        }
    }

    for (slot, (_, display)) in LANGUAGES.iter().enumerate() {
        let positional = format!("audio_{}", slot + 1);
        if track.label == positional || (track.label.is_empty() && index_in_list == slot) {
            return display.to_string();
        }
    }

    if !track.label.is_empty() {
        return track.label.clone();
    }
    format!("Audio {}", index_in_list + 1)
}

/// Display name for whichever track is currently enabled.
///
/// Falls back to the first track before any selection has happened, and to
/// `"Default"` while the track list is still empty.
pub fn active_label(tracks: &[AudioTrack]) -> String {
    if let Some((index, track)) = tracks.iter().enumerate().find(|(_, t)| t.enabled) {
        return resolve_label(track, index);
    }
    if let Some(first) = tracks.first() {
        return resolve_label(first, 0);
    }
    "Default".to_string()
}

/// Build the ordered listing the language menu renders.
pub fn listing(tracks: &[AudioTrack]) -> Vec<TrackEntry> {
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| TrackEntry {
            index,
            display_label: resolve_label(track, index),
            enabled: track.enabled,
        })
        .collect()
}
