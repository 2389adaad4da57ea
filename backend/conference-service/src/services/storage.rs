/// Object storage for recorded files
///
/// Recordings are written to S3-compatible storage by the egress platform;
/// this module only reads (presigned GET) and deletes. The [`ObjectStore`]
/// trait keeps the coordinator testable without a bucket.
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

use crate::config::S3Config;
use crate::error::{AppError, Result};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Time-limited read URL for a stored object. An optional
    /// `Content-Disposition` override is baked into the signed URL, so a
    /// browser can be steered to save instead of play.
    async fn presign_get(
        &self,
        key: &str,
        ttl_secs: u64,
        disposition: Option<&str>,
    ) -> Result<String>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Initialize the AWS S3 client from config.
    ///
    /// Supports explicit credentials and a custom endpoint with path-style
    /// addressing for S3-compatible services like MinIO or iDrive E2.
    pub async fn connect(config: &S3Config) -> Self {
        use aws_sdk_s3::config::Region;

        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            use aws_sdk_s3::config::Credentials;

            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "conference_service_s3",
            );
            aws_config_builder = aws_config_builder.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_get(
        &self,
        key: &str,
        ttl_secs: u64,
        disposition: Option<&str>,
    ) -> Result<String> {
        let presigning_config = PresigningConfig::builder()
            .expires_in(Duration::from_secs(ttl_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create presigning config: {e}")))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_disposition(disposition.map(String::from))
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to generate presigned URL: {e}")))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("403") || error_msg.contains("Forbidden") {
                    AppError::Upstream("S3 auth failed (403): Check credentials".to_string())
                } else {
                    AppError::Upstream(format!("S3 delete failed: {}", e))
                }
            })?;
        Ok(())
    }
}
