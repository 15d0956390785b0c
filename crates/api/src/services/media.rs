//! Restaurant image hosting.
//!
//! Images are pushed to Cloudinary with a signed upload and referenced by the
//! URL Cloudinary returns. Uploads are never deleted; if the write that follows
//! an upload fails, the uploaded image is left orphaned.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::CloudinaryConfig;

/// Cloudinary API base URL.
const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("image upload request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("image upload response error: {0}")]
    Response(String),

    /// The image host rejected the upload.
    #[error("image host error: {0}")]
    Api(String),
}

/// An uploaded image file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// MIME type reported by the client, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Encode the file as a `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Something that can host an image and hand back its public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload `image`, returning the URL it is served from.
    async fn upload(&self, image: ImageFile) -> Result<String, MediaError>;
}

/// Cloudinary upload API client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{CLOUDINARY_API_BASE}/{}/image/upload", self.cloud_name)
    }
}

#[async_trait]
impl ImageUploader for CloudinaryClient {
    #[instrument(skip(self, image), fields(content_type = %image.content_type, bytes = image.bytes.len()))]
    async fn upload(&self, image: ImageFile) -> Result<String, MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut signed = BTreeMap::new();
        signed.insert("timestamp", timestamp.as_str());
        let signature = sign_params(&signed, &self.api_secret);

        let form = [
            ("file", image.to_data_uri()),
            ("api_key", self.api_key.clone()),
            ("timestamp", timestamp.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .client
            .post(self.upload_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| MediaError::Request(e.to_string()))?;

        let status = response.status();
        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Response(format!("{status}: {e}")))?;

        if let Some(api_error) = result.error {
            error!(status = %status, error = %api_error.message, "Cloudinary rejected upload");
            return Err(MediaError::Api(api_error.message));
        }
        if !status.is_success() {
            error!(status = %status, "Cloudinary upload failed");
            return Err(MediaError::Api(format!("unexpected status {status}")));
        }

        let url = result
            .url
            .ok_or_else(|| MediaError::Response("missing url in upload response".to_string()))?;

        debug!(url = %url, "Image uploaded to Cloudinary");

        Ok(url)
    }
}

/// Sign upload parameters: `k=v` pairs sorted by key and joined with `&`,
/// followed by the API secret, hashed with SHA-256 and hex encoded.
///
/// `file`, `api_key`, `cloud_name` and `resource_type` must not be included.
fn sign_params(params: &BTreeMap<&str, &str>, api_secret: &SecretString) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("abcd")
    }

    #[test]
    fn test_data_uri() {
        let image = ImageFile {
            content_type: "image/png".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_sign_params_timestamp_only() {
        let params = BTreeMap::from([("timestamp", "1315060510")]);
        assert_eq!(
            sign_params(&params, &secret()),
            "5652e549a70bdc03f73a633a23b7d3f3b067d72fff26dd15b25997f46fdf6439"
        );
    }

    #[test]
    fn test_sign_params_sorts_keys() {
        let params = BTreeMap::from([("timestamp", "1315060510"), ("folder", "restaurants")]);
        assert_eq!(
            sign_params(&params, &secret()),
            "cecf91fd25fee7039e597e85f9c117a357456a17517293c38ce0472848992b26"
        );
    }

    #[test]
    fn test_upload_url_uses_cloud_name() {
        let client = CloudinaryClient::new(&CloudinaryConfig {
            cloud_name: "dinehub".to_string(),
            api_key: "1234".to_string(),
            api_secret: secret(),
        });
        assert_eq!(
            client.upload_url(),
            "https://api.cloudinary.com/v1_1/dinehub/image/upload"
        );
        assert!(!format!("{client:?}").contains("abcd"));
    }

    #[test]
    fn test_error_body_parses() {
        let body: UploadResponse =
            serde_json::from_str(r#"{"error":{"message":"Invalid Signature"}}"#).unwrap();
        assert!(body.url.is_none());
        assert_eq!(body.error.unwrap().message, "Invalid Signature");
    }
}
