use std::path::Path;

use async_trait::async_trait;

use crate::domain::error::UploadError;

/// Result of a successful hand-off to the media host.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub url: String,
}

/// Seam for the third-party media host: takes a locally staged file and
/// returns a durable hosted URL.
#[async_trait]
pub trait MediaUploader {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, UploadError>;
}
