/// Recording playback, sharing, and deletion endpoints
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{RecordingResponse, ShareResponse};
use crate::services::RecordingCoordinator;

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid recording ID".to_string()))
}

/// List the caller's recordings
pub async fn list_recordings(
    coordinator: web::Data<RecordingCoordinator>,
    user: UserId,
) -> Result<HttpResponse> {
    let recordings = coordinator.list(user.0).await?;
    let responses: Vec<RecordingResponse> = recordings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(json!({ "recordings": responses })))
}

/// Owner-only playback payload: presigned video URL plus the timeline data
/// (chat log, transcript, recording start instant).
pub async fn stream_recording(
    coordinator: web::Data<RecordingCoordinator>,
    user: UserId,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let payload = coordinator.stream(parse_id(&id)?, user.0).await?;
    Ok(HttpResponse::Ok().json(payload))
}

/// Public playback payload, gated by an unexpired share token.
pub async fn stream_shared(
    coordinator: web::Data<RecordingCoordinator>,
    token: web::Path<String>,
) -> Result<HttpResponse> {
    let payload = coordinator.stream_shared(&token).await?;
    Ok(HttpResponse::Ok().json(payload))
}

/// Redirect to a presigned URL that downloads the file as an attachment
pub async fn download_recording(
    coordinator: web::Data<RecordingCoordinator>,
    user: UserId,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let url = coordinator.download(parse_id(&id)?, user.0).await?;
    Ok(HttpResponse::TemporaryRedirect()
        .append_header(("Location", url))
        .finish())
}

/// Mint (or replace) the share link for a recording
pub async fn share_recording(
    coordinator: web::Data<RecordingCoordinator>,
    user: UserId,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let (share_token, share_expires) = coordinator.share(parse_id(&id)?, user.0).await?;
    Ok(HttpResponse::Ok().json(ShareResponse {
        share_token,
        share_expires,
    }))
}

/// Delete a recording and (best-effort) its stored file
pub async fn delete_recording(
    coordinator: web::Data<RecordingCoordinator>,
    user: UserId,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    coordinator.delete(parse_id(&id)?, user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
