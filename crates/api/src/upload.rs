//! Relay for file uploads to external object storage.
//!
//! Uploaded bytes pass straight through: the API holds them only for the
//! duration of the relayed request and never writes them to disk.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while relaying an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The relayed request failed or the storage service returned an error.
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The file part had an unusable content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),
}

#[derive(Debug, Deserialize)]
struct StoredObject {
    url: String,
}

/// Client for the external object storage service.
#[derive(Debug, Clone)]
pub struct ObjectStorageRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl ObjectStorageRelay {
    /// Create a relay targeting the configured storage endpoint.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Forward one file to the storage service and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if the content type is malformed, the request
    /// fails, or the service responds with a non-success status.
    pub async fn relay(
        &self,
        file_name: String,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|_| UploadError::InvalidContentType(content_type.to_owned()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let stored: StoredObject = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(stored.url)
    }
}
