/// Recording repository - database operations for recordings
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{NewRecording, Recording, TerminalUpdate};

const RECORDING_COLUMNS: &str = "id, room_id, owner_id, egress_id, room_name, session_id, \
     s3_key, duration, size, chat_log, transcript, recording_started_at, \
     share_token, share_expires, status, created_at, updated_at";

pub async fn insert(pool: &PgPool, recording: NewRecording) -> Result<Recording> {
    let row = sqlx::query_as::<_, Recording>(&format!(
        "INSERT INTO recordings (id, room_id, owner_id, egress_id, room_name, session_id, \
         s3_key, recording_started_at, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'recording', NOW(), NOW()) \
         RETURNING {RECORDING_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(recording.room_id)
    .bind(recording.owner_id)
    .bind(&recording.egress_id)
    .bind(&recording.room_name)
    .bind(&recording.session_id)
    .bind(&recording.s3_key)
    .bind(recording.recording_started_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(row)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Recording>> {
    let row = sqlx::query_as::<_, Recording>(&format!(
        "SELECT {RECORDING_COLUMNS} FROM recordings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_egress_id(pool: &PgPool, egress_id: &str) -> Result<Option<Recording>> {
    let row = sqlx::query_as::<_, Recording>(&format!(
        "SELECT {RECORDING_COLUMNS} FROM recordings WHERE egress_id = $1"
    ))
    .bind(egress_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_share_token(pool: &PgPool, token: &str) -> Result<Option<Recording>> {
    let row = sqlx::query_as::<_, Recording>(&format!(
        "SELECT {RECORDING_COLUMNS} FROM recordings WHERE share_token = $1"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Recording>> {
    let rows = sqlx::query_as::<_, Recording>(&format!(
        "SELECT {RECORDING_COLUMNS} FROM recordings WHERE owner_id = $1 \
         ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_active_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Recording>> {
    let rows = sqlx::query_as::<_, Recording>(&format!(
        "SELECT {RECORDING_COLUMNS} FROM recordings \
         WHERE owner_id = $1 AND status = 'recording' \
         ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Conditioned single-row write: only rows still in `recording` state move,
/// so concurrent stop and cleanup converge on the same terminal value.
pub async fn mark_terminal(
    pool: &PgPool,
    egress_id: &str,
    update: TerminalUpdate,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE recordings SET status = $2, \
         duration = COALESCE($3, duration), \
         size = COALESCE($4, size), \
         chat_log = COALESCE($5, chat_log), \
         transcript = COALESCE($6, transcript), \
         updated_at = NOW() \
         WHERE egress_id = $1 AND status = 'recording'",
    )
    .bind(egress_id)
    .bind(update.status().as_str())
    .bind(update.duration)
    .bind(update.size)
    .bind(&update.chat_log)
    .bind(&update.transcript)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_share(
    pool: &PgPool,
    id: Uuid,
    token: &str,
    expires: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE recordings SET share_token = $2, share_expires = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(token)
    .bind(expires)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM recordings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
