/// Recording lifecycle coordinator
///
/// Owns the recording state machine: start an egress job and persist the
/// durable row, reconcile the row against the platform on stop and during
/// cleanup sweeps, and serve playback/share/delete over completed rows.
///
/// The platform and the database can disagree (user action, platform
/// polling, page reload); the rule throughout is that the local ledger is
/// the one the rest of the system trusts, and it must never stay stuck at
/// `recording` once the underlying job has actually ended.
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::RecordingStore;
use crate::egress::{EgressApi, EgressJob};
use crate::error::{AppError, Result};
use crate::models::{
    EgressJobResponse, NewRecording, Recording, RecordingStatus, StreamResponse, TerminalUpdate,
};
use crate::services::storage::ObjectStore;

/// Presigned playback URLs live for one hour; clients refresh at 50 minutes.
pub const STREAM_URL_TTL_SECS: u64 = 3600;

/// Share links expire a fixed 7 days from issuance.
pub const SHARE_TTL_DAYS: i64 = 7;

/// Deterministic storage key for a new recording.
pub fn recording_object_key(room_name: &str, timestamp_ms: i64) -> String {
    format!("recordings/{}/{}.mp4", room_name, timestamp_ms)
}

/// Normalize a client-buffered chat log before persisting it: parse, sort
/// chronologically, re-serialize. Malformed or empty logs store as NULL so
/// the player never has to re-handle garbage.
fn normalized_chat_log(raw: Option<String>) -> Option<String> {
    let messages = meet_core::timeline::parse_chat_log(raw.as_deref());
    if messages.is_empty() {
        None
    } else {
        serde_json::to_string(&messages).ok()
    }
}

#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub egress_id: String,
    pub filepath: String,
}

#[derive(Debug, Clone)]
pub struct StopOutcome {
    /// True when the platform had already terminated the job and no stop
    /// command was issued.
    pub already_completed: bool,
}

/// Extra payload the client buffered during the live session, persisted with
/// the terminal update on stop.
#[derive(Debug, Clone, Default)]
pub struct SessionArtifacts {
    pub chat_log: Option<String>,
    pub transcript: Option<String>,
}

pub struct RecordingCoordinator {
    store: Arc<dyn RecordingStore>,
    egress: Arc<dyn EgressApi>,
    objects: Arc<dyn ObjectStore>,
}

impl RecordingCoordinator {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        egress: Arc<dyn EgressApi>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            egress,
            objects,
        }
    }

    /// Start composite recording of a room.
    ///
    /// The row is written only after the platform accepts the start call, so
    /// a rejected start leaves no partial state. A recording is never
    /// persisted without an owner: the requesting user, else the room's
    /// owner, else the request is rejected.
    pub async fn start(
        &self,
        room_name: &str,
        requesting_user: Option<Uuid>,
        session_id: Option<String>,
    ) -> Result<StartOutcome> {
        if room_name.trim().is_empty() {
            return Err(AppError::Validation("Room name is required".to_string()));
        }

        let room = self.store.find_room(room_name).await?;
        let owner_id = requesting_user
            .or(room.map(|r| r.owner_id))
            .ok_or_else(|| {
                AppError::Unauthorized("No resolvable owner for this recording".to_string())
            })?;

        let started_at = Utc::now();
        let s3_key = recording_object_key(room_name, started_at.timestamp_millis());

        let job = self.egress.start_room_composite(room_name, &s3_key).await?;

        let recording = self
            .store
            .insert(NewRecording {
                room_id: room.map(|r| r.id),
                owner_id,
                egress_id: job.egress_id.clone(),
                room_name: room_name.to_string(),
                session_id,
                s3_key: s3_key.clone(),
                recording_started_at: started_at,
            })
            .await?;

        tracing::info!(
            egress_id = %job.egress_id,
            recording_id = %recording.id,
            room = room_name,
            "recording started"
        );

        Ok(StartOutcome {
            egress_id: job.egress_id,
            filepath: s3_key,
        })
    }

    /// Stop a recording.
    ///
    /// The platform's current status is queried before any stop command:
    /// stopping an already-terminated job is the documented source of
    /// spurious platform errors, and the platform's own terminal signal is
    /// more trustworthy than our row. Whatever the platform says, this
    /// method always leaves the row at a terminal status.
    pub async fn stop(
        &self,
        egress_id: &str,
        artifacts: SessionArtifacts,
    ) -> Result<StopOutcome> {
        let recording = self
            .store
            .find_by_egress_id(egress_id)
            .await?
            .ok_or_else(|| AppError::NotFoundOrUnauthorized("Recording not found".to_string()))?;

        let job = match self.egress.list_by_egress_id(egress_id).await {
            Ok(jobs) => jobs.into_iter().find(|j| j.egress_id == egress_id),
            Err(err) => {
                // Platform unreachable. Absorb: the user asked for a stop, so
                // the row must reach a terminal state regardless.
                tracing::warn!(egress_id, error = %err, "status query failed during stop, marking failed");
                self.finalize(egress_id, true, None, artifacts).await?;
                return Ok(StopOutcome {
                    already_completed: false,
                });
            }
        };

        match job {
            None => {
                // The platform has no record of the job: unexpectedly missing.
                tracing::warn!(egress_id, "egress job missing on platform, marking failed");
                self.finalize(egress_id, true, None, artifacts).await?;
                Ok(StopOutcome {
                    already_completed: true,
                })
            }
            Some(job) if job.status.is_terminal() => {
                let failed = job.status.is_failure();
                self.finalize(egress_id, failed, Some(&job), artifacts).await?;
                Ok(StopOutcome {
                    already_completed: true,
                })
            }
            Some(job) => {
                // Job still active: issue the stop. The stop command is
                // best-effort transport; a failure must not leave the row
                // stuck at `recording` after an explicit stop request.
                if let Err(err) = self.egress.stop(egress_id).await {
                    tracing::warn!(egress_id, error = %err, "platform stop failed, completing locally");
                }
                self.finalize(egress_id, false, Some(&job), artifacts).await?;
                tracing::info!(egress_id, recording_id = %recording.id, "recording stopped");
                Ok(StopOutcome {
                    already_completed: false,
                })
            }
        }
    }

    async fn finalize(
        &self,
        egress_id: &str,
        failed: bool,
        job: Option<&EgressJob>,
        artifacts: SessionArtifacts,
    ) -> Result<bool> {
        let update = TerminalUpdate {
            failed,
            duration: job.and_then(|j| j.duration_secs),
            size: job.and_then(|j| j.size_bytes),
            chat_log: normalized_chat_log(artifacts.chat_log),
            transcript: artifacts.transcript,
        };
        self.store.mark_terminal(egress_id, update).await
    }

    /// Reconciliation sweep over one owner's in-flight recordings.
    ///
    /// Runs opportunistically (dashboard load) rather than on a schedule.
    /// Rows whose platform job is gone, finished, or unreachable move to a
    /// terminal status; rows whose job is genuinely still active are left
    /// alone. An unreachable platform marks the row `failed` rather than
    /// leaving it ambiguous: a stuck `recording` row blocks every later
    /// sweep, which is worse than a false negative.
    ///
    /// Returns the number of rows changed, so callers know whether to
    /// refresh their view.
    pub async fn cleanup(&self, owner_id: Uuid) -> Result<usize> {
        let active = self.store.list_active_by_owner(owner_id).await?;
        let mut cleaned = 0;

        for recording in active {
            let egress_id = recording.egress_id.as_str();
            let update = match self.egress.list_by_egress_id(egress_id).await {
                Err(err) => {
                    tracing::warn!(egress_id, error = %err, "status query failed during cleanup, marking failed");
                    TerminalUpdate::failed()
                }
                Ok(jobs) => {
                    match jobs.into_iter().find(|j| j.egress_id == egress_id) {
                        None => {
                            tracing::warn!(egress_id, "egress job missing on platform, marking failed");
                            TerminalUpdate::failed()
                        }
                        Some(job) if job.status.is_failure() => TerminalUpdate {
                            failed: true,
                            duration: job.duration_secs,
                            size: job.size_bytes,
                            ..TerminalUpdate::default()
                        },
                        Some(job) if job.status.is_terminal() => TerminalUpdate {
                            failed: false,
                            duration: job.duration_secs,
                            size: job.size_bytes,
                            ..TerminalUpdate::default()
                        },
                        // Still recording for real; nothing to reconcile.
                        Some(_) => continue,
                    }
                }
            };

            if self.store.mark_terminal(egress_id, update).await? {
                cleaned += 1;
            }
        }

        if cleaned > 0 {
            tracing::info!(owner_id = %owner_id, cleaned, "cleanup sweep reconciled recordings");
        }
        Ok(cleaned)
    }

    /// Read-only pass-through of the platform's jobs for a room.
    pub async fn status(&self, room_name: &str) -> Result<Vec<EgressJobResponse>> {
        if room_name.trim().is_empty() {
            return Err(AppError::Validation("Room name is required".to_string()));
        }
        let jobs = self.egress.list_by_room(room_name).await?;
        Ok(jobs
            .into_iter()
            .map(|job| EgressJobResponse {
                egress_id: job.egress_id,
                status: job.status.code(),
                started_at: job.started_at,
                ended_at: job.ended_at,
            })
            .collect())
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Recording>> {
        self.store.list_by_owner(owner_id).await
    }

    /// Playback payload for the owner.
    pub async fn stream(&self, id: Uuid, owner_id: Uuid) -> Result<StreamResponse> {
        let recording = self.owned(id, owner_id).await?;
        self.stream_payload(recording).await
    }

    /// Playback payload for a share-token holder.
    pub async fn stream_shared(&self, token: &str) -> Result<StreamResponse> {
        let recording = self
            .store
            .find_by_share_token(token)
            .await?
            .ok_or_else(|| AppError::NotFoundOrUnauthorized("Recording not found".to_string()))?;

        if recording.share_expired(Utc::now()) {
            return Err(AppError::ExpiredShareLink("Share link has expired".to_string()));
        }

        self.stream_payload(recording).await
    }

    async fn stream_payload(&self, recording: Recording) -> Result<StreamResponse> {
        if recording.get_status() != RecordingStatus::Completed {
            return Err(AppError::NotYetCompleted(
                "Recording not yet completed".to_string(),
            ));
        }

        let video_url = self
            .objects
            .presign_get(&recording.s3_key, STREAM_URL_TTL_SECS, None)
            .await?;

        Ok(StreamResponse {
            video_url,
            duration: recording.duration,
            chat_log: recording.chat_log.clone(),
            transcript: recording.transcript.clone(),
            recording_started_at: recording.started_at_ms(),
            created_at: recording.created_at.timestamp_millis(),
            room_name: recording.room_name,
        })
    }

    /// Presigned URL that downloads the file instead of playing it: the
    /// signed URL carries an attachment disposition naming the file after
    /// the room and the recording date. Ownership required.
    pub async fn download(&self, id: Uuid, owner_id: Uuid) -> Result<String> {
        let recording = self.owned(id, owner_id).await?;
        let disposition = format!(
            "attachment; filename=\"{}-{}.mp4\"",
            recording.room_name,
            recording.created_at.format("%Y-%m-%d")
        );
        self.objects
            .presign_get(&recording.s3_key, STREAM_URL_TTL_SECS, Some(&disposition))
            .await
    }

    /// Mint a fresh share token with a fixed expiry horizon, replacing any
    /// previous one. Only one share link is active per recording.
    pub async fn share(&self, id: Uuid, owner_id: Uuid) -> Result<(String, i64)> {
        let recording = self.owned(id, owner_id).await?;

        let token = Uuid::new_v4().to_string();
        let expires = Utc::now() + Duration::days(SHARE_TTL_DAYS);
        self.store.set_share(recording.id, &token, expires).await?;

        Ok((token, expires.timestamp_millis()))
    }

    /// Delete a recording and its backing object.
    ///
    /// The object delete is best-effort: a storage-layer outage must not
    /// block the user from removing the row.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let recording = self.owned(id, owner_id).await?;

        if let Err(err) = self.objects.delete_object(&recording.s3_key).await {
            tracing::error!(
                recording_id = %recording.id,
                s3_key = %recording.s3_key,
                error = %err,
                "failed to delete backing object, removing row anyway"
            );
        }

        self.store.delete(recording.id).await?;
        tracing::info!(recording_id = %recording.id, "recording deleted");
        Ok(())
    }

    /// Fetch a recording enforcing exact ownership. Missing row and
    /// ownership mismatch are indistinguishable to the caller.
    async fn owned(&self, id: Uuid, owner_id: Uuid) -> Result<Recording> {
        match self.store.find_by_id(id).await? {
            Some(recording) if recording.owner_id == owner_id => Ok(recording),
            _ => Err(AppError::NotFoundOrUnauthorized(
                "Recording not found or unauthorized".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_deterministic() {
        assert_eq!(
            recording_object_key("team-standup", 1_700_000_000_000),
            "recordings/team-standup/1700000000000.mp4"
        );
    }

    #[test]
    fn test_chat_log_normalized_before_persisting() {
        assert_eq!(normalized_chat_log(None), None);
        assert_eq!(normalized_chat_log(Some("not json".to_string())), None);
        assert_eq!(normalized_chat_log(Some("[]".to_string())), None);

        let jittered = r#"[
            {"from":"bob","message":"late","timestamp":3000},
            {"from":"ann","message":"first","timestamp":1000}
        ]"#;
        let stored = normalized_chat_log(Some(jittered.to_string())).unwrap();
        let ann = stored.find("ann").unwrap();
        let bob = stored.find("bob").unwrap();
        assert!(ann < bob);
    }
}
