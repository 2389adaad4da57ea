/// Room CRUD endpoints
use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::room_repo;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CreateRoomRequest, RoomResponse};

/// Build a URL-safe room slug: lowercased name with a short random suffix so
/// repeated names stay unique.
pub fn room_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    let suffix = Uuid::new_v4().simple().to_string();
    if slug.is_empty() {
        format!("room-{}", &suffix[..6])
    } else {
        format!("{}-{}", slug, &suffix[..6])
    }
}

/// Create a room owned by the caller
pub async fn create_room(
    pool: web::Data<PgPool>,
    user: UserId,
    req: web::Json<CreateRoomRequest>,
) -> Result<HttpResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Room name is required".to_string()));
    }

    let room = room_repo::create(pool.get_ref(), &room_slug(&req.name), user.0).await?;
    Ok(HttpResponse::Created().json(RoomResponse::from(room)))
}

/// List the caller's rooms
pub async fn list_rooms(pool: web::Data<PgPool>, user: UserId) -> Result<HttpResponse> {
    let rooms = room_repo::list_by_owner(pool.get_ref(), user.0).await?;
    let responses: Vec<RoomResponse> = rooms.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(json!({ "rooms": responses })))
}

/// Delete an owned room. Recordings made in the room keep their rows.
pub async fn delete_room(
    pool: web::Data<PgPool>,
    user: UserId,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let room_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid room ID".to_string()))?;

    let deleted = room_repo::delete_owned(pool.get_ref(), room_id, user.0).await?;
    if !deleted {
        return Err(AppError::NotFoundOrUnauthorized(
            "Room not found or unauthorized".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_slug_normalizes_name() {
        let slug = room_slug("Team Standup! (Weekly)");
        assert!(slug.starts_with("team-standup-weekly-"));
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_room_slug_handles_symbol_only_names() {
        let slug = room_slug("!!!");
        assert!(slug.starts_with("room-"));
    }

    #[test]
    fn test_room_slugs_are_unique_per_call() {
        assert_ne!(room_slug("standup"), room_slug("standup"));
    }
}
