//! Playback position and stream source state
//!
//! The player reports its position asynchronously, while the UI must react to
//! seeks immediately. The cursor keeps "requested" and "confirmed" positions
//! as independent slices instead of one mutable variable, so rapid repeated
//! seeks have an unambiguous contract.

use chrono::{DateTime, Utc};

/// Confirmed positions within this distance of a pending seek settle it.
const SEEK_SETTLE_EPSILON_SECS: f64 = 0.5;

/// Presigned playback URLs are valid for one hour; refresh proactively at 50
/// minutes rather than reacting to a failed fetch mid-playback.
pub const STREAM_URL_REFRESH_AFTER_SECS: i64 = 50 * 60;

/// Two-slice playback cursor: an optimistic requested position and the
/// player-confirmed position.
#[derive(Debug, Clone, Default)]
pub struct PlaybackCursor {
    requested: Option<f64>,
    confirmed: f64,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user seek. The effective position moves immediately, without
    /// waiting for the player's own position-changed signal, so highlights
    /// track the interaction synchronously.
    pub fn request_seek(&mut self, seconds: f64) {
        self.requested = Some(seconds.max(0.0));
    }

    /// Adopt a position reported by the player. A report at or near the
    /// pending seek target settles the request; reports elsewhere leave it
    /// pending (the player has not caught up yet).
    pub fn confirm(&mut self, seconds: f64) {
        if let Some(target) = self.requested {
            if (seconds - target).abs() <= SEEK_SETTLE_EPSILON_SECS {
                self.requested = None;
            } else {
                return;
            }
        }
        self.confirmed = seconds;
    }

    /// Effective position: the pending seek if one exists, else the last
    /// confirmed position.
    pub fn position(&self) -> f64 {
        self.requested.unwrap_or(self.confirmed)
    }

    pub fn has_pending_seek(&self) -> bool {
        self.requested.is_some()
    }
}

/// A presigned playback URL together with its issue instant.
#[derive(Debug, Clone)]
pub struct StreamSource {
    url: String,
    issued_at: DateTime<Utc>,
}

impl StreamSource {
    pub fn new(url: String, issued_at: DateTime<Utc>) -> Self {
        Self { url, issued_at }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True once the URL is within ten minutes of expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        (now - self.issued_at).num_seconds() >= STREAM_URL_REFRESH_AFTER_SECS
    }

    pub fn refresh(&mut self, url: String, now: DateTime<Utc>) {
        self.url = url;
        self.issued_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_seek_is_optimistic() {
        let mut cursor = PlaybackCursor::new();
        cursor.confirm(3.0);
        cursor.request_seek(12.5);
        assert_eq!(cursor.position(), 12.5);
        assert!(cursor.has_pending_seek());
    }

    #[test]
    fn test_stale_confirmations_ignored_while_seeking() {
        let mut cursor = PlaybackCursor::new();
        cursor.confirm(3.0);
        cursor.request_seek(60.0);
        // Player still reporting pre-seek positions.
        cursor.confirm(3.2);
        assert_eq!(cursor.position(), 60.0);
        // Player lands on the target; request settles.
        cursor.confirm(60.1);
        assert!(!cursor.has_pending_seek());
        assert_eq!(cursor.position(), 60.1);
    }

    #[test]
    fn test_rapid_repeated_seeks_keep_last_target() {
        let mut cursor = PlaybackCursor::new();
        cursor.request_seek(10.0);
        cursor.request_seek(20.0);
        cursor.request_seek(5.0);
        assert_eq!(cursor.position(), 5.0);
        cursor.confirm(20.0); // confirmation for a superseded target
        assert_eq!(cursor.position(), 5.0);
    }

    #[test]
    fn test_negative_seek_clamped() {
        let mut cursor = PlaybackCursor::new();
        cursor.request_seek(-4.0);
        assert_eq!(cursor.position(), 0.0);
    }

    #[test]
    fn test_stream_source_refresh_window() {
        let issued = Utc::now();
        let mut source = StreamSource::new("https://s3/a?sig=1".into(), issued);
        assert!(!source.needs_refresh(issued + Duration::minutes(49)));
        assert!(source.needs_refresh(issued + Duration::minutes(50)));

        let later = issued + Duration::minutes(50);
        source.refresh("https://s3/a?sig=2".into(), later);
        assert_eq!(source.url(), "https://s3/a?sig=2");
        assert!(!source.needs_refresh(later + Duration::minutes(10)));
    }
}
