/// Data models for conference-service
///
/// This module defines structures for:
/// - Recording: one durable row per egress job
/// - Room: named meeting rooms
/// - Request/response DTOs for the HTTP surface
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// Recording Models
// ========================================

/// Recording lifecycle status. Transitions only move forward:
/// `recording -> {completed, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Recording,
    Completed,
    Failed,
}

impl RecordingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recording => "recording",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "recording" => Some(Self::Recording),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Recording database entity. `egress_id` is the idempotency key for all
/// reconciliation against the platform.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recording {
    pub id: Uuid,
    /// Nullable: the room may have been deleted since.
    pub room_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub egress_id: String,
    pub room_name: String,
    pub session_id: Option<String>,
    pub s3_key: String,
    /// Seconds, filled when the platform reports it.
    pub duration: Option<i64>,
    /// Bytes, filled when the platform reports it.
    pub size: Option<i64>,
    pub chat_log: Option<String>,
    pub transcript: Option<String>,
    /// Wall-clock origin for timeline sync. Distinct from `created_at`,
    /// which is row-insert time.
    pub recording_started_at: Option<DateTime<Utc>>,
    pub share_token: Option<String>,
    pub share_expires: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recording {
    pub fn get_status(&self) -> RecordingStatus {
        RecordingStatus::from_str(&self.status).unwrap_or(RecordingStatus::Recording)
    }

    /// Timeline origin in epoch milliseconds. Rows created before the
    /// `recording_started_at` column existed fall back to insert time.
    pub fn started_at_ms(&self) -> i64 {
        self.recording_started_at
            .unwrap_or(self.created_at)
            .timestamp_millis()
    }

    pub fn share_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.share_expires, Some(expires) if expires < now)
    }
}

/// Fields for a new recording row, written the instant the egress start
/// call succeeds.
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub room_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub egress_id: String,
    pub room_name: String,
    pub session_id: Option<String>,
    pub s3_key: String,
    pub recording_started_at: DateTime<Utc>,
}

/// Terminal-status write, keyed by egress id. Only applied while the row is
/// still `recording`, so concurrent stop/cleanup converge benignly.
#[derive(Debug, Clone, Default)]
pub struct TerminalUpdate {
    pub failed: bool,
    pub duration: Option<i64>,
    pub size: Option<i64>,
    pub chat_log: Option<String>,
    pub transcript: Option<String>,
}

impl TerminalUpdate {
    pub fn completed() -> Self {
        Self::default()
    }

    pub fn failed() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }

    pub fn status(&self) -> RecordingStatus {
        if self.failed {
            RecordingStatus::Failed
        } else {
            RecordingStatus::Completed
        }
    }
}

/// Recording list entry DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingResponse {
    pub id: String,
    pub room_name: String,
    pub status: String,
    pub duration: Option<i64>,
    pub size: Option<i64>,
    pub share_token: Option<String>,
    pub share_expires: Option<i64>,
    pub recording_started_at: i64,
    pub created_at: i64,
}

impl From<Recording> for RecordingResponse {
    fn from(recording: Recording) -> Self {
        Self {
            id: recording.id.to_string(),
            status: recording.status.clone(),
            duration: recording.duration,
            size: recording.size,
            share_token: recording.share_token.clone(),
            share_expires: recording.share_expires.map(|dt| dt.timestamp_millis()),
            recording_started_at: recording.started_at_ms(),
            created_at: recording.created_at.timestamp_millis(),
            room_name: recording.room_name,
        }
    }
}

// ========================================
// Room Models
// ========================================

/// Room database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Room lookup used for owner resolution at recording start.
#[derive(Debug, Clone, Copy)]
pub struct RoomRef {
    pub id: Uuid,
    pub owner_id: Uuid,
}

/// Room response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name,
            created_at: room.created_at.timestamp_millis(),
        }
    }
}

/// Create room request DTO
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

// ========================================
// Recording action DTOs
// ========================================

/// Body of `POST /api/v1/recording`, dispatched on `action`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingActionRequest {
    pub action: String,
    pub room_name: Option<String>,
    pub egress_id: Option<String>,
    /// Chat events buffered client-side during the session, serialized JSON.
    pub chat_log: Option<String>,
    /// Finalized caption lines, flattened to text.
    pub transcript: Option<String>,
    pub session_id: Option<String>,
}

/// One platform job in a `status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgressJobResponse {
    pub egress_id: String,
    pub status: i32,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

/// Stream payload consumed by the player page and its timeline reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamResponse {
    pub video_url: String,
    pub duration: Option<i64>,
    pub chat_log: Option<String>,
    pub transcript: Option<String>,
    pub recording_started_at: i64,
    pub room_name: String,
    pub created_at: i64,
}

/// Share link response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub share_token: String,
    pub share_expires: i64,
}

// ========================================
// Token DTOs
// ========================================

/// Join token request DTO
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub room_name: String,
    pub identity: String,
}

/// Join token response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
