/// Recording action endpoint
///
/// `POST /api/v1/recording` dispatches on the `action` field, mirroring the
/// in-room client which drives start/stop/status from a single call site.
/// Auth is optional here: a guest participant can start a recording in a
/// room whose owner is on file, and the owner falls back accordingly.
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::MaybeUser;
use crate::models::RecordingActionRequest;
use crate::services::recording::{SessionArtifacts, StopOutcome};
use crate::services::RecordingCoordinator;

/// Stop response body. `already_completed` only appears when the platform
/// had already terminated the job; the plain outcome is a bare success.
fn stop_response(outcome: &StopOutcome) -> serde_json::Value {
    let mut body = json!({ "success": true });
    if outcome.already_completed {
        body["already_completed"] = json!(true);
    }
    body
}

pub async fn recording_action(
    coordinator: web::Data<RecordingCoordinator>,
    user: MaybeUser,
    req: web::Json<RecordingActionRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    match req.action.as_str() {
        "start" => {
            let room_name = req
                .room_name
                .ok_or_else(|| AppError::Validation("Room name is required".to_string()))?;
            let outcome = coordinator.start(&room_name, user.0, req.session_id).await?;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "egress_id": outcome.egress_id,
                "filepath": outcome.filepath,
            })))
        }
        "stop" => {
            let egress_id = req
                .egress_id
                .ok_or_else(|| AppError::Validation("Egress ID is required".to_string()))?;
            let artifacts = SessionArtifacts {
                chat_log: req.chat_log,
                transcript: req.transcript,
            };
            let outcome = coordinator.stop(&egress_id, artifacts).await?;
            Ok(HttpResponse::Ok().json(stop_response(&outcome)))
        }
        "status" => {
            let room_name = req
                .room_name
                .ok_or_else(|| AppError::Validation("Room name is required".to_string()))?;
            let recordings = coordinator.status(&room_name).await?;
            Ok(HttpResponse::Ok().json(json!({ "recordings": recordings })))
        }
        "cleanup" => {
            let owner_id = user.0.ok_or_else(|| {
                AppError::Unauthorized("Sign in to clean up recordings".to_string())
            })?;
            let cleaned = coordinator.cleanup(owner_id).await?;
            Ok(HttpResponse::Ok().json(json!({ "success": true, "cleaned": cleaned })))
        }
        other => Err(AppError::Validation(format!("Unknown action: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_response_omits_already_completed_when_false() {
        let body = stop_response(&StopOutcome {
            already_completed: false,
        });
        assert_eq!(body, json!({ "success": true }));

        let body = stop_response(&StopOutcome {
            already_completed: true,
        });
        assert_eq!(body, json!({ "success": true, "already_completed": true }));
    }
}
