//! Source resolution - lecture identifiers to media and subtitle URIs
//!
//! Lecture media lives on a CDN under a folder naming convention: each
//! lecture folder holds an adaptive `master.m3u8` manifest and a WebVTT
//! subtitle file named after the folder. A couple of legacy lectures use
//! folder names that differ from their identifiers.

use crate::error::Result;
use crate::types::MediaSource;
use serde::{Deserialize, Serialize};
use url::Url;

/// Content type of a video source, inferred from the URI extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Playlist-style source describing multiple bitrate variants
    AdaptiveManifest,
    /// Single progressive media file
    DirectFile,
}

impl SourceKind {
    /// Infer the source kind from a media URI
    pub fn from_uri(uri: &Url) -> Self {
        let path = uri.path().to_ascii_lowercase();
        if path.ends_with(".m3u8") || path.ends_with(".m3u") {
            SourceKind::AdaptiveManifest
        } else {
            SourceKind::DirectFile
        }
    }

    /// MIME type handed to the playback engine alongside the URI
    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceKind::AdaptiveManifest => "application/x-mpegURL",
            SourceKind::DirectFile => "video/mp4",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::AdaptiveManifest => write!(f, "adaptive-manifest"),
            SourceKind::DirectFile => write!(f, "direct-file"),
        }
    }
}

/// Resolves lecture identifiers to [`MediaSource`] values
#[derive(Debug, Clone)]
pub struct SourceResolver {
    cdn_base: Url,
    media_prefix: String,
}

impl SourceResolver {
    pub fn new(cdn_base: Url, media_prefix: impl Into<String>) -> Self {
        Self {
            cdn_base,
            media_prefix: media_prefix.into(),
        }
    }

    /// Resolve a lecture identifier to its video and subtitle URIs.
    ///
    /// Video: `{base}/{prefix}/{folder}/master.m3u8`.
    /// Subtitles: `{base}/{prefix}/{folder}/{folder with '-' -> '_'}_subtitle.vtt`.
    pub fn resolve(&self, lecture_id: &str) -> Result<MediaSource> {
        let folder = folder_for(lecture_id);
        let base = self
            .cdn_base
            .join(&format!("{}/{}/", self.media_prefix.trim_matches('/'), folder))?;
        let video_uri = base.join("master.m3u8")?;
        let subtitle_uri = base.join(&format!("{}_subtitle.vtt", folder.replace('-', "_")))?;
        Ok(MediaSource {
            video_uri,
            subtitle_uri,
            content_id: lecture_id.to_string(),
        })
    }
}

/// Map a lecture identifier to its CDN folder name.
///
/// Legacy lectures were uploaded under shortened folder names before the
/// convention settled; everything newer uses the identifier verbatim.
fn folder_for(lecture_id: &str) -> &str {
    match lecture_id {
        "projectile_motion" => "projectile",
        "human_heart" => "human-heart",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SourceResolver {
        SourceResolver::new(
            Url::parse("https://cdn.example.com/").unwrap(),
            "media/lectures",
        )
    }

    #[test]
    fn test_source_kind_from_uri() {
        let manifest = Url::parse("https://cdn.example.com/waves/master.m3u8").unwrap();
        assert_eq!(SourceKind::from_uri(&manifest), SourceKind::AdaptiveManifest);
        assert_eq!(SourceKind::from_uri(&manifest).mime_type(), "application/x-mpegURL");

        let file = Url::parse("https://cdn.example.com/waves/lecture.mp4").unwrap();
        assert_eq!(SourceKind::from_uri(&file), SourceKind::DirectFile);
        assert_eq!(SourceKind::from_uri(&file).mime_type(), "video/mp4");

        let upper = Url::parse("https://cdn.example.com/waves/MASTER.M3U8").unwrap();
        assert_eq!(SourceKind::from_uri(&upper), SourceKind::AdaptiveManifest);
    }

    #[test]
    fn test_resolve_plain_identifier() {
        let source = resolver().resolve("waves").unwrap();
        assert_eq!(
            source.video_uri.as_str(),
            "https://cdn.example.com/media/lectures/waves/master.m3u8"
        );
        assert_eq!(
            source.subtitle_uri.as_str(),
            "https://cdn.example.com/media/lectures/waves/waves_subtitle.vtt"
        );
        assert_eq!(source.content_id, "waves");
    }

    #[test]
    fn test_resolve_legacy_folders() {
        let source = resolver().resolve("projectile_motion").unwrap();
        assert_eq!(
            source.video_uri.as_str(),
            "https://cdn.example.com/media/lectures/projectile/master.m3u8"
        );
        assert_eq!(source.content_id, "projectile_motion");

        // Hyphenated folder names flip to underscores in the subtitle file
        let source = resolver().resolve("human_heart").unwrap();
        assert_eq!(
            source.video_uri.as_str(),
            "https://cdn.example.com/media/lectures/human-heart/master.m3u8"
        );
        assert_eq!(
            source.subtitle_uri.as_str(),
            "https://cdn.example.com/media/lectures/human-heart/human_heart_subtitle.vtt"
        );
    }
}
