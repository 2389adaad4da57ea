/// Database layer
///
/// Raw-SQL repository functions plus the [`RecordingStore`] seam the
/// coordinator is written against. `PgStore` is the production
/// implementation; tests inject an in-memory fake.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewRecording, Recording, RoomRef, TerminalUpdate};

pub mod recording_repo;
pub mod room_repo;

/// Durable recording ledger. All reconciliation is keyed by egress id.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn insert(&self, recording: NewRecording) -> Result<Recording>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recording>>;

    async fn find_by_egress_id(&self, egress_id: &str) -> Result<Option<Recording>>;

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Recording>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Recording>>;

    /// Rows still in `recording` state for one owner (cleanup sweep input).
    async fn list_active_by_owner(&self, owner_id: Uuid) -> Result<Vec<Recording>>;

    /// Move a row to a terminal status. Returns false when the row was
    /// already terminal; the write is conditioned on `status = 'recording'`
    /// so status never moves backward.
    async fn mark_terminal(&self, egress_id: &str, update: TerminalUpdate) -> Result<bool>;

    async fn set_share(&self, id: Uuid, token: &str, expires: DateTime<Utc>) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Room lookup for owner resolution at recording start.
    async fn find_room(&self, room_name: &str) -> Result<Option<RoomRef>>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordingStore for PgStore {
    async fn insert(&self, recording: NewRecording) -> Result<Recording> {
        recording_repo::insert(&self.pool, recording).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recording>> {
        recording_repo::find_by_id(&self.pool, id).await
    }

    async fn find_by_egress_id(&self, egress_id: &str) -> Result<Option<Recording>> {
        recording_repo::find_by_egress_id(&self.pool, egress_id).await
    }

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Recording>> {
        recording_repo::find_by_share_token(&self.pool, token).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Recording>> {
        recording_repo::list_by_owner(&self.pool, owner_id).await
    }

    async fn list_active_by_owner(&self, owner_id: Uuid) -> Result<Vec<Recording>> {
        recording_repo::list_active_by_owner(&self.pool, owner_id).await
    }

    async fn mark_terminal(&self, egress_id: &str, update: TerminalUpdate) -> Result<bool> {
        recording_repo::mark_terminal(&self.pool, egress_id, update).await
    }

    async fn set_share(&self, id: Uuid, token: &str, expires: DateTime<Utc>) -> Result<()> {
        recording_repo::set_share(&self.pool, id, token, expires).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        recording_repo::delete(&self.pool, id).await
    }

    async fn find_room(&self, room_name: &str) -> Result<Option<RoomRef>> {
        room_repo::find_ref_by_name(&self.pool, room_name).await
    }
}
