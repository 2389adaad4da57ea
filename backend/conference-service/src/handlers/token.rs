/// Join token endpoint
///
/// Mints the access token a client presents to the media platform when
/// joining a room. Guests are allowed; identity comes from the request.
use actix_web::{web, HttpResponse};

use crate::config::Config;
use crate::egress::{token, VideoGrant};
use crate::error::{AppError, Result};
use crate::models::{TokenRequest, TokenResponse};

/// Join tokens are valid for 6 hours.
const JOIN_TOKEN_TTL_SECS: i64 = 6 * 3600;

pub async fn issue_token(
    config: web::Data<Config>,
    req: web::Json<TokenRequest>,
) -> Result<HttpResponse> {
    if req.room_name.trim().is_empty() {
        return Err(AppError::Validation("Room name is required".to_string()));
    }
    if req.identity.trim().is_empty() {
        return Err(AppError::Validation("Identity is required".to_string()));
    }

    let token = token::mint(
        &config.egress.api_key,
        &config.egress.api_secret,
        &req.identity,
        VideoGrant::join(&req.room_name),
        JOIN_TOKEN_TTL_SECS,
    )?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
