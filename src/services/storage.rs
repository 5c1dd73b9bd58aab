// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! S3-compatible object storage for deletion-feedback photos.

use crate::error::AppError;
use crate::services::upload::ImageFormat;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;

/// Object storage client.
#[derive(Clone)]
pub struct StorageClient {
    client: Option<aws_sdk_s3::Client>,
    bucket: String,
    public_url: String,
}

impl StorageClient {
    /// Create a new storage client for an S3-compatible endpoint.
    pub fn new(
        endpoint: &str,
        bucket: String,
        access_key_id: &str,
        secret_access_key: &str,
        public_url: String,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "portray-api",
        );

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new("auto"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Some(aws_sdk_s3::Client::from_conf(config)),
            bucket,
            public_url,
        }
    }

    /// Create a mock client for offline tests. All calls return an error.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            bucket: "mock".to_string(),
            public_url: "http://localhost/mock".to_string(),
        }
    }

    fn get_client(&self) -> Result<&aws_sdk_s3::Client, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Storage not configured (offline mode)"))
        })
    }

    /// Upload one feedback photo, returning its public URL.
    pub async fn upload_feedback_photo(
        &self,
        uid: &str,
        index: usize,
        data: Vec<u8>,
        format: ImageFormat,
    ) -> Result<String, AppError> {
        let key = feedback_photo_key(uid, index, format.extension());

        self.get_client()?
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(format.mime())
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Photo upload failed: {}", e)))?;

        Ok(self.public_url_for(&key))
    }

    /// Public URL for a stored key.
    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), key)
    }
}

/// Per-user, timestamp-namespaced storage key.
fn feedback_photo_key(uid: &str, index: usize, extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("feedback/{}/{}_{}.{}", uid, millis, index, extension)
}
