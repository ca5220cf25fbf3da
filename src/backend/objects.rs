use super::{check_status, BackendError, RestClient};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Upload size limit applied before anything is sent.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_BUCKET: &str = "portfolio";
pub const DEFAULT_FOLDER: &str = "profile";

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

/// Build a unique object name as `<folder>/<unix millis>.<ext>`.
#[must_use]
pub fn object_name(folder: &str, file_name: &str, unix_millis: i64) -> String {
    let folder = folder.trim_matches('/');
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{folder}/{unix_millis}.{ext}"),
        None => format!("{folder}/{unix_millis}"),
    }
}

impl RestClient {
    /// Store an object without overwriting an existing one.
    ///
    /// Returns the object path inside the bucket.
    ///
    /// # Errors
    /// Returns an error if the payload is too large, on transport failure, or a non-2xx status.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(BackendError::Status {
                status: 413,
                message: format!("File size exceeds {}MB limit", MAX_UPLOAD_BYTES / 1024 / 1024),
            });
        }

        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{object}"))?;
        let response = self
            .authorized(self.http().post(url))
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;
        let response = check_status(response).await?;

        // Older storage APIs echo `Key` as "<bucket>/<object>".
        let stored = response
            .json::<UploadResponse>()
            .await
            .ok()
            .and_then(|body| body.key)
            .map_or_else(
                || object.to_string(),
                |key| {
                    key.strip_prefix(&format!("{bucket}/"))
                        .map_or(key.clone(), str::to_string)
                },
            );

        info!("uploaded {bucket}/{stored}");

        Ok(stored)
    }

    /// Public URL for an object in a public bucket.
    ///
    /// # Errors
    /// Returns an error if the resulting URL is invalid.
    pub fn public_url(&self, bucket: &str, object: &str) -> Result<Url, BackendError> {
        self.endpoint(&format!("storage/v1/object/public/{bucket}/{object}"))
    }
}

/// Guess an image content type from the file extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
