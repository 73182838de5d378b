//! Image storage collaborator.
//!
//! Product images are pushed to an external HTTP store that answers with
//! a public URL; only the URL persists with the product. Deployments
//! without a store configured fall back to [`DisabledImageStore`], which
//! reports uploads as unavailable instead of silently dropping them.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the image storage collaborator.
#[derive(Debug, Error)]
pub enum ImageStorageError {
    /// No store configured for this deployment.
    #[error("Image storage is not configured")]
    Disabled,

    /// The store rejected or failed the upload.
    #[error("Image upload failed")]
    Upload(#[source] reqwest::Error),

    /// The store answered with something other than a URL.
    #[error("Image store returned an unusable response")]
    BadResponse,
}

/// An uploaded file awaiting storage.
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Storage seam for product images.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store one image, returning its public URL.
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageStorageError>;
}

/// HTTP-backed image store.
pub struct HttpImageStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImageStore {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct UploadResponse {
    url: String,
}

#[async_trait]
impl ImageStorage for HttpImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageStorageError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(|_| ImageStorageError::BadResponse)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(ImageStorageError::Upload)?
            .error_for_status()
            .map_err(ImageStorageError::Upload)?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|_| ImageStorageError::BadResponse)?;
        Ok(body.url)
    }
}

/// Fallback store for deployments without image storage configured.
pub struct DisabledImageStore;

#[async_trait]
impl ImageStorage for DisabledImageStore {
    async fn store(&self, _upload: ImageUpload) -> Result<String, ImageStorageError> {
        Err(ImageStorageError::Disabled)
    }
}

/// Test double that "stores" images under a fixed prefix.
#[cfg(test)]
pub struct StubImageStore;

#[cfg(test)]
#[async_trait]
impl ImageStorage for StubImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageStorageError> {
        Ok(format!("https://images.test/{}", upload.filename))
    }
}
