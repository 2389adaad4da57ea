/// Room repository - database operations for rooms
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Room, RoomRef};

pub async fn create(pool: &PgPool, name: &str, owner_id: Uuid) -> Result<Room> {
    let room = sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (id, name, owner_id, created_at) \
         VALUES ($1, $2, $3, NOW()) \
         RETURNING id, name, owner_id, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(room)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(
        "SELECT id, name, owner_id, created_at FROM rooms \
         WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rooms)
}

pub async fn find_ref_by_name(pool: &PgPool, name: &str) -> Result<Option<RoomRef>> {
    let row: Option<(Uuid, Uuid)> =
        sqlx::query_as("SELECT id, owner_id FROM rooms WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id, owner_id)| RoomRef { id, owner_id }))
}

/// Delete a room owned by the caller. Recordings keep their rows; the FK
/// nulls `room_id`. Returns false when no owned row matched.
pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
