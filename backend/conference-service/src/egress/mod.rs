/// Egress platform client
///
/// The media platform composites a live room into a recorded file and writes
/// it to object storage ("egress"). This module is the only place that talks
/// to the platform's HTTP API; the coordinator consumes it through the
/// [`EgressApi`] trait so tests can inject a fake.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{EgressConfig, S3Config};

pub mod token;

pub use token::VideoGrant;

/// Service-token lifetime for platform API calls (10 minutes).
const SERVICE_TOKEN_TTL_SECS: i64 = 600;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("egress platform unreachable: {0}")]
    Transport(String),
    #[error("egress platform returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to sign access token: {0}")]
    Token(String),
}

impl From<reqwest::Error> for EgressError {
    fn from(err: reqwest::Error) -> Self {
        EgressError::Transport(err.to_string())
    }
}

/// Platform job status. Numeric on the wire; codes at or above
/// [`EgressStatus::Complete`] are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum EgressStatus {
    Starting,
    Active,
    Ending,
    Updating,
    Complete,
    Failed,
    Aborted,
    /// Code the platform may add later; treated as terminal failure.
    Unknown(i32),
}

impl EgressStatus {
    pub fn code(&self) -> i32 {
        match self {
            Self::Starting => 0,
            Self::Active => 1,
            Self::Ending => 2,
            Self::Updating => 3,
            Self::Complete => 4,
            Self::Failed => 5,
            Self::Aborted => 6,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.code() >= Self::Complete.code()
    }

    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != Self::Complete
    }
}

impl From<i32> for EgressStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Starting,
            1 => Self::Active,
            2 => Self::Ending,
            3 => Self::Updating,
            4 => Self::Complete,
            5 => Self::Failed,
            6 => Self::Aborted,
            other => Self::Unknown(other),
        }
    }
}

impl From<EgressStatus> for i32 {
    fn from(status: EgressStatus) -> Self {
        status.code()
    }
}

/// One egress job as reported by the platform.
#[derive(Debug, Clone)]
pub struct EgressJob {
    pub egress_id: String,
    pub status: EgressStatus,
    /// Epoch milliseconds.
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    /// Late-filled by the platform once the file is finalized.
    pub duration_secs: Option<i64>,
    pub size_bytes: Option<i64>,
}

/// Commands and queries against the egress platform.
#[async_trait]
pub trait EgressApi: Send + Sync {
    /// Begin composite recording of a room into the given storage key.
    async fn start_room_composite(
        &self,
        room_name: &str,
        s3_key: &str,
    ) -> Result<EgressJob, EgressError>;

    /// Stop a job. Stopping an already-terminated job is a platform error;
    /// callers query first.
    async fn stop(&self, egress_id: &str) -> Result<(), EgressError>;

    /// All jobs matching an egress id (empty when the platform has no record
    /// of it).
    async fn list_by_egress_id(&self, egress_id: &str) -> Result<Vec<EgressJob>, EgressError>;

    /// All jobs for a room name.
    async fn list_by_room(&self, room_name: &str) -> Result<Vec<EgressJob>, EgressError>;
}

// ========================================
// Wire types (platform JSON API)
// ========================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct S3UploadTarget<'a> {
    access_key: &'a str,
    secret: &'a str,
    bucket: &'a str,
    region: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<&'a str>,
    force_path_style: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileOutput<'a> {
    filepath: &'a str,
    s3: S3UploadTarget<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartCompositeRequest<'a> {
    room_name: &'a str,
    layout: &'a str,
    audio_only: bool,
    video_only: bool,
    file: FileOutput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopRequest<'a> {
    egress_id: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    egress_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    #[serde(default)]
    duration_ms: Option<i64>,
    #[serde(default)]
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EgressInfo {
    egress_id: String,
    status: i32,
    #[serde(default)]
    started_at: Option<i64>,
    #[serde(default)]
    ended_at: Option<i64>,
    #[serde(default)]
    file: Option<FileResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<EgressInfo>,
}

impl From<EgressInfo> for EgressJob {
    fn from(info: EgressInfo) -> Self {
        let file = info.file;
        Self {
            egress_id: info.egress_id,
            status: EgressStatus::from(info.status),
            started_at: info.started_at,
            ended_at: info.ended_at,
            duration_secs: file.as_ref().and_then(|f| f.duration_ms).map(|ms| ms / 1000),
            size_bytes: file.and_then(|f| f.size),
        }
    }
}

// ========================================
// HTTP client
// ========================================

/// HTTP implementation against the platform's Twirp-style JSON API.
pub struct HttpEgressClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    s3: S3Config,
}

impl HttpEgressClient {
    pub fn new(egress: &EgressConfig, s3: S3Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: egress.url.trim_end_matches('/').to_string(),
            api_key: egress.api_key.clone(),
            api_secret: egress.api_secret.clone(),
            s3,
        }
    }

    async fn call<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &Req,
    ) -> Result<Resp, EgressError> {
        let service_token = token::mint(
            &self.api_key,
            &self.api_secret,
            "conference-service",
            VideoGrant::record(),
            SERVICE_TOKEN_TTL_SECS,
        )?;

        let url = format!("{}/twirp/egress.Egress/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .bearer_auth(service_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EgressError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Resp>().await?)
    }

    fn upload_target<'a>(&'a self, filepath: &'a str) -> FileOutput<'a> {
        FileOutput {
            filepath,
            s3: S3UploadTarget {
                access_key: self.s3.access_key_id.as_deref().unwrap_or_default(),
                secret: self.s3.secret_access_key.as_deref().unwrap_or_default(),
                bucket: &self.s3.bucket,
                region: &self.s3.region,
                endpoint: self.s3.endpoint.as_deref(),
                force_path_style: self.s3.force_path_style,
            },
        }
    }
}

#[async_trait]
impl EgressApi for HttpEgressClient {
    async fn start_room_composite(
        &self,
        room_name: &str,
        s3_key: &str,
    ) -> Result<EgressJob, EgressError> {
        let request = StartCompositeRequest {
            room_name,
            layout: "grid",
            audio_only: false,
            video_only: false,
            file: self.upload_target(s3_key),
        };
        let info: EgressInfo = self.call("StartRoomCompositeEgress", &request).await?;
        Ok(info.into())
    }

    async fn stop(&self, egress_id: &str) -> Result<(), EgressError> {
        let _: EgressInfo = self.call("StopEgress", &StopRequest { egress_id }).await?;
        Ok(())
    }

    async fn list_by_egress_id(&self, egress_id: &str) -> Result<Vec<EgressJob>, EgressError> {
        let request = ListRequest {
            egress_id: Some(egress_id),
            ..ListRequest::default()
        };
        let response: ListResponse = self.call("ListEgress", &request).await?;
        Ok(response.items.into_iter().map(Into::into).collect())
    }

    async fn list_by_room(&self, room_name: &str) -> Result<Vec<EgressJob>, EgressError> {
        let request = ListRequest {
            room_name: Some(room_name),
            ..ListRequest::default()
        };
        let response: ListResponse = self.call("ListEgress", &request).await?;
        Ok(response.items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in 0..=6 {
            assert_eq!(EgressStatus::from(code).code(), code);
        }
        assert_eq!(EgressStatus::from(42), EgressStatus::Unknown(42));
    }

    #[test]
    fn test_terminal_threshold() {
        assert!(!EgressStatus::Starting.is_terminal());
        assert!(!EgressStatus::Active.is_terminal());
        assert!(!EgressStatus::Ending.is_terminal());
        assert!(!EgressStatus::Updating.is_terminal());
        assert!(EgressStatus::Complete.is_terminal());
        assert!(EgressStatus::Failed.is_terminal());
        assert!(EgressStatus::Aborted.is_terminal());
    }

    #[test]
    fn test_only_complete_is_success() {
        assert!(!EgressStatus::Complete.is_failure());
        assert!(EgressStatus::Failed.is_failure());
        assert!(EgressStatus::Aborted.is_failure());
        assert!(EgressStatus::Unknown(9).is_failure());
        assert!(!EgressStatus::Active.is_failure());
    }

    #[test]
    fn test_egress_info_maps_file_result() {
        let info: EgressInfo = serde_json::from_value(serde_json::json!({
            "egressId": "EG_1",
            "status": 4,
            "startedAt": 1_700_000_000_000_i64,
            "endedAt": 1_700_000_060_000_i64,
            "file": { "durationMs": 60_500, "size": 12_345_678 }
        }))
        .unwrap();

        let job = EgressJob::from(info);
        assert_eq!(job.status, EgressStatus::Complete);
        assert_eq!(job.duration_secs, Some(60));
        assert_eq!(job.size_bytes, Some(12_345_678));
    }
}
