//! Timeline reconciliation for recorded sessions
//!
//! Chat messages and captions are logged with absolute wall-clock timestamps
//! while the session is live. Playback happens on the recorded video's own
//! relative clock, so every event has to be mapped onto it using the
//! recording's start instant as the common origin.

use serde::{Deserialize, Serialize};

/// A single chat message captured during a live session.
///
/// `timestamp` is milliseconds since the Unix epoch. The serialized log is
/// insertion-ordered, which across multiple participants is not guaranteed
/// chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub message: String,
    pub timestamp: i64,
}

/// Map an absolute event timestamp onto the video's playback clock.
///
/// Clamped at zero: clock skew can log an event fractionally before the
/// server-recorded start instant.
pub fn offset_seconds(event_ms: i64, origin_ms: i64) -> f64 {
    ((event_ms - origin_ms) as f64 / 1000.0).max(0.0)
}

/// Parse a serialized chat log into chronological order.
///
/// A malformed or absent log degrades to no messages. A corrupt chat log must
/// never block video playback.
pub fn parse_chat_log(raw: Option<&str>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = raw
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    messages.sort_by_key(|m| m.timestamp);
    messages
}

/// Reconciled event timeline for one recording.
///
/// Binds in both directions: playback position to "which event is current"
/// via [`Timeline::advance`], and event click to a seek target via
/// [`Timeline::seek_target`].
#[derive(Debug, Clone)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
    offsets: Vec<f64>,
    current: Option<usize>,
}

impl Timeline {
    /// Build a timeline from the recording's start instant and its raw chat log.
    pub fn new(origin_ms: i64, chat_log: Option<&str>) -> Self {
        let messages = parse_chat_log(chat_log);
        let offsets = messages
            .iter()
            .map(|m| offset_seconds(m.timestamp, origin_ms))
            .collect();
        Self {
            messages,
            offsets,
            current: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Playback position to seek to when the user clicks an event.
    pub fn seek_target(&self, index: usize) -> Option<f64> {
        self.offsets.get(index).copied()
    }

    /// Index of the last event at or before the given playback position,
    /// `None` if playback has not reached the first event yet.
    ///
    /// Recomputed on every time update rather than cached; the per-recording
    /// event count is bounded.
    pub fn current_index(&self, playback_secs: f64) -> Option<usize> {
        for i in (0..self.offsets.len()).rev() {
            if self.offsets[i] <= playback_secs {
                return Some(i);
            }
        }
        None
    }

    /// Advance the highlight to the given playback position.
    ///
    /// Returns the new index only when the highlight moved; callers scroll the
    /// corresponding element into view on every `Some`. This keeps auto-scroll
    /// a pure side effect of state change.
    pub fn advance(&mut self, playback_secs: f64) -> Option<usize> {
        let next = self.current_index(playback_secs);
        if next != self.current {
            self.current = next;
            next
        } else {
            None
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.current
    }
}

/// Format a playback offset as MM:SS for event rows.
pub fn format_offset(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(entries: &[(&str, &str, i64)]) -> String {
        let messages: Vec<ChatMessage> = entries
            .iter()
            .map(|(from, message, ts)| ChatMessage {
                from: from.to_string(),
                message: message.to_string(),
                timestamp: *ts,
            })
            .collect();
        serde_json::to_string(&messages).unwrap()
    }

    #[test]
    fn test_offset_clamps_clock_skew_to_zero() {
        // Event logged 300ms before the recorded start instant.
        assert_eq!(offset_seconds(999_700, 1_000_000), 0.0);
        assert_eq!(offset_seconds(1_000_000, 1_000_000), 0.0);
        assert_eq!(offset_seconds(1_012_500, 1_000_000), 12.5);
    }

    #[test]
    fn test_parse_degrades_to_empty() {
        assert!(parse_chat_log(None).is_empty());
        assert!(parse_chat_log(Some("")).is_empty());
        assert!(parse_chat_log(Some("not json")).is_empty());
        assert!(parse_chat_log(Some("{\"from\":\"a\"}")).is_empty());
    }

    #[test]
    fn test_parse_sorts_jittered_log() {
        let raw = log(&[("bob", "late", 3000), ("ann", "first", 1000), ("cat", "mid", 2000)]);
        let messages = parse_chat_log(Some(&raw));
        let order: Vec<&str> = messages.iter().map(|m| m.from.as_str()).collect();
        assert_eq!(order, vec!["ann", "bob", "cat"]);
    }

    #[test]
    fn test_offsets_monotonic_after_sort() {
        let origin = 1_000;
        let raw = log(&[("a", "x", 9_000), ("b", "y", 2_000), ("c", "z", 5_500)]);
        let timeline = Timeline::new(origin, Some(&raw));
        let offsets: Vec<f64> = (0..timeline.len())
            .map(|i| timeline.seek_target(i).unwrap())
            .collect();
        for pair in offsets.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_current_index_tracks_playback() {
        let raw = log(&[("a", "x", 1_000), ("b", "y", 6_000), ("c", "z", 11_000)]);
        let timeline = Timeline::new(1_000, Some(&raw));

        assert_eq!(timeline.current_index(0.0), Some(0));
        assert_eq!(timeline.current_index(4.9), Some(0));
        assert_eq!(timeline.current_index(5.0), Some(1));
        assert_eq!(timeline.current_index(60.0), Some(2));

        // Before the first event there is nothing to highlight.
        let later = Timeline::new(0, Some(&raw));
        assert_eq!(later.current_index(0.5), None);
    }

    #[test]
    fn test_advance_fires_only_on_change() {
        let raw = log(&[("a", "x", 1_000), ("b", "y", 6_000)]);
        let mut timeline = Timeline::new(1_000, Some(&raw));

        assert_eq!(timeline.advance(0.0), Some(0));
        assert_eq!(timeline.advance(1.0), None);
        assert_eq!(timeline.advance(5.0), Some(1));
        assert_eq!(timeline.advance(5.5), None);
        // Seeking backwards moves the highlight back.
        assert_eq!(timeline.advance(2.0), Some(0));
        assert_eq!(timeline.highlighted(), Some(0));
    }

    #[test]
    fn test_click_to_seek_scenario() {
        // Chat event at T0 + 12500ms seeks to 12.5s.
        let t0 = 1_700_000_000_000_i64;
        let raw = log(&[("ann", "hello", t0 + 12_500)]);
        let mut timeline = Timeline::new(t0, Some(&raw));

        let target = timeline.seek_target(0).unwrap();
        assert_eq!(target, 12.5);
        assert_eq!(timeline.advance(target), Some(0));
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0.0), "0:00");
        assert_eq!(format_offset(12.5), "0:12");
        assert_eq!(format_offset(75.0), "1:15");
        assert_eq!(format_offset(-3.0), "0:00");
    }
}
