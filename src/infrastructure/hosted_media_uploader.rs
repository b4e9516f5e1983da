use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{
    error::UploadError,
    services::media_service::{MediaUploader, UploadedMedia},
};

/// Body returned by the media host on a successful upload.
#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

/// Uploads staged files to the hosted media API over HTTP. The staged local
/// file is spent by the attempt and removed whatever the outcome.
#[derive(Clone)]
pub struct HostedMediaUploader {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HostedMediaUploader {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    async fn push(&self, local_path: &Path) -> Result<UploadedMedia, UploadError> {
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(local_path).await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected(format!(
                "status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(UploadedMedia { url: body.url })
    }
}

#[async_trait]
impl MediaUploader for HostedMediaUploader {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, UploadError> {
        let result = self.push(local_path).await;

        if let Err(e) = tokio::fs::remove_file(local_path).await {
            warn!(
                "failed to remove staged file {}: {e}",
                local_path.display()
            );
        }

        result
    }
}
