//! Transcript synchronization - deriving the active segment from the
//! session's time stream and driving auto-scroll and click-to-seek
//!
//! A segment's active window is `[start, next.start)`; the last segment's
//! window extends to content end. Segment clicks go through the same
//! timestamp-seek contract the in-lecture chat uses.

use crate::session::MediaSession;
use crate::timecode;
use serde::{Deserialize, Serialize};

/// One transcript entry. Immutable once loaded for a given lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start of this segment's window, in seconds
    pub start_time: f64,
    pub text: String,
}

/// View-level side effect requested by the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Smooth-scroll the segment at this index to the container's center
    ScrollTo(usize),
}

/// Index of the segment whose window contains `current_time`.
///
/// `None` when the time precedes the first segment (or the list is empty);
/// clamps to the last segment for any time past its start.
pub fn active_index(current_time: f64, segments: &[TranscriptSegment]) -> Option<usize> {
    match segments.first() {
        Some(first) if current_time >= first.start_time => {}
        _ => return None,
    }
    let upper = segments.partition_point(|s| s.start_time <= current_time);
    Some(upper - 1)
}

/// Tracks the active transcript segment for one lecture and decides when
/// the view needs to scroll.
#[derive(Debug, Clone)]
pub struct TranscriptSync {
    segments: Vec<TranscriptSegment>,
    last_scrolled: Option<usize>,
}

impl TranscriptSync {
    /// Build a synchronizer from the lecture's segments.
    ///
    /// Upstream produces an ordered, duplicate-free sequence; sorting and
    /// deduplicating here makes that a guarantee rather than an assumption.
    pub fn new(mut segments: Vec<TranscriptSegment>) -> Self {
        segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        segments.dedup_by(|a, b| a.start_time == b.start_time);
        Self {
            segments,
            last_scrolled: None,
        }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    /// Active segment index at the given playback time
    pub fn active_index(&self, current_time: f64) -> Option<usize> {
        active_index(current_time, &self.segments)
    }

    /// Feed a time update; returns a scroll action only when the active
    /// index actually changed, so the view never re-scrolls for the same
    /// segment.
    pub fn update(&mut self, current_time: f64) -> Option<SyncAction> {
        let active = self.active_index(current_time);
        if active == self.last_scrolled {
            return None;
        }
        self.last_scrolled = active;
        active.map(SyncAction::ScrollTo)
    }

    /// Replace the segment list when the lecture changes
    pub fn reload(&mut self, segments: Vec<TranscriptSegment>) {
        *self = Self::new(segments);
    }

    /// Time-code string for a segment, as rendered next to its text
    pub fn segment_timecode(&self, index: usize) -> Option<String> {
        self.segments.get(index).map(|s| timecode::format(s.start_time))
    }

    /// Handle a click on a segment: seek through the shared timestamp
    /// contract and let play-after-seek take over.
    pub async fn seek_to_segment(&self, session: &MediaSession, index: usize) {
        if let Some(code) = self.segment_timecode(index) {
            session.seek_timecode(&code).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        [0.0, 10.0, 25.0]
            .iter()
            .enumerate()
            .map(|(i, start)| TranscriptSegment {
                start_time: *start,
                text: format!("segment {i}"),
            })
            .collect()
    }

    #[test]
    fn test_active_index_boundaries() {
        let segments = segments();
        assert_eq!(active_index(0.0, &segments), Some(0));
        assert_eq!(active_index(9.999, &segments), Some(0));
        assert_eq!(active_index(10.0, &segments), Some(1));
        assert_eq!(active_index(24.999, &segments), Some(1));
        assert_eq!(active_index(25.0, &segments), Some(2));
        // Last window extends to content end
        assert_eq!(active_index(1000.0, &segments), Some(2));
    }

    #[test]
    fn test_active_index_before_first_and_empty() {
        let segments = vec![TranscriptSegment {
            start_time: 5.0,
            text: "late start".into(),
        }];
        assert_eq!(active_index(4.9, &segments), None);
        assert_eq!(active_index(5.0, &segments), Some(0));
        assert_eq!(active_index(0.0, &[]), None);
    }

    #[test]
    fn test_scroll_fires_once_per_segment() {
        let mut sync = TranscriptSync::new(segments());
        assert_eq!(sync.update(0.5), Some(SyncAction::ScrollTo(0)));
        assert_eq!(sync.update(3.0), None);
        assert_eq!(sync.update(9.9), None);
        assert_eq!(sync.update(10.0), Some(SyncAction::ScrollTo(1)));
        assert_eq!(sync.update(12.0), None);
        // Seeking backwards re-activates the earlier segment
        assert_eq!(sync.update(1.0), Some(SyncAction::ScrollTo(0)));
    }

    #[test]
    fn test_unordered_input_is_normalized() {
        let sync = TranscriptSync::new(vec![
            TranscriptSegment { start_time: 25.0, text: "c".into() },
            TranscriptSegment { start_time: 0.0, text: "a".into() },
            TranscriptSegment { start_time: 10.0, text: "b".into() },
            TranscriptSegment { start_time: 10.0, text: "b again".into() },
        ]);
        let starts: Vec<f64> = sync.segments().iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![0.0, 10.0, 25.0]);
    }

    #[test]
    fn test_segment_timecode() {
        let sync = TranscriptSync::new(vec![TranscriptSegment {
            start_time: 65.0,
            text: "a minute in".into(),
        }]);
        assert_eq!(sync.segment_timecode(0).as_deref(), Some("1:05"));
        assert_eq!(sync.segment_timecode(1), None);
    }
}
