//! Object storage uploads (member photos, payment receipts).
//!
//! Files go to the hosted storage bucket with a single `PUT`; the public URL
//! returned is what the membership application records in `photo_url` or
//! `payment_proof_url`.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::{AuthVariant, BaasConfig, ClientConfig, Timeouts};
use crate::error::{self, ClientError};
use crate::state::token::TokenStore;

pub const UPLOAD_FALLBACK: &str = "Upload failed";

/// Progress of one upload.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    /// Public URL of the stored object.
    Uploaded(String),
    Failed(String),
}

pub const STORAGE_NOT_CONFIGURED: &str = "uploads need PARISHAT_BAAS_URL and PARISHAT_BAAS_ANON_KEY";

pub struct StorageClient {
    http: reqwest::Client,
    baas: BaasConfig,
    /// Present only when the stored token was issued by the storage/auth
    /// service itself.
    user_tokens: Option<Arc<dyn TokenStore>>,
}

impl StorageClient {
    /// Client that authorizes every write with the anonymous key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built.
    pub fn new(baas: BaasConfig, timeouts: Timeouts) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, baas, user_tokens: None })
    }

    /// Authorize writes with the signed-in user's token from `tokens`.
    #[must_use]
    pub fn with_user_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.user_tokens = Some(tokens);
        self
    }

    /// Client for `config`. Only the password variant stores a token the
    /// storage service can verify; the PIN variant's token is signed by the
    /// membership API and stays there.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when no storage service is configured.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let baas = config.baas.clone().ok_or_else(|| ClientError::Config(STORAGE_NOT_CONFIGURED.into()))?;
        let client = Self::new(baas, config.timeouts)?;
        Ok(match config.auth_variant {
            AuthVariant::Password => client.with_user_tokens(tokens),
            AuthVariant::Pin => client,
        })
    }

    /// Bucket uploads go to unless the caller names another.
    #[must_use]
    pub fn default_bucket(&self) -> &str {
        &self.baas.bucket
    }

    #[must_use]
    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{path}", self.baas.url)
    }

    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.baas.url)
    }

    /// Store `bytes` at `bucket/path` and return its public URL.
    ///
    /// The user's token authorizes the write when this client forwards one
    /// and a token is stored; the anonymous key is used otherwise.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty file, otherwise the transport
    /// or server error.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ClientError> {
        if bytes.is_empty() {
            return Err(ClientError::Validation("File is empty".into()));
        }
        let user_token = self.user_tokens.as_ref().and_then(|tokens| tokens.load().ok().flatten());
        let bearer = user_token.unwrap_or_else(|| self.baas.anon_key.clone());

        tracing::debug!(bucket, path, size = bytes.len(), "storage upload");
        let response = self
            .http
            .put(self.object_url(bucket, path))
            .header("apikey", &self.baas.anon_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .bearer_auth(bearer)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let text = response.text().await.unwrap_or_default();
            return Err(error::from_status(status, &text));
        }
        Ok(self.public_url(bucket, path))
    }
}

/// Tracks one upload through [`UploadState`].
#[derive(Debug, Default)]
pub struct Upload {
    state: UploadState,
}

impl Upload {
    #[must_use]
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Run `client.upload`, moving through `Uploading` to `Uploaded` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns the upload error; the display message is kept in `Failed`.
    pub async fn run(
        &mut self,
        client: &StorageClient,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ClientError> {
        self.state = UploadState::Uploading;
        match client.upload(bucket, path, bytes, content_type).await {
            Ok(url) => {
                self.state = UploadState::Uploaded(url.clone());
                Ok(url)
            }
            Err(e) => {
                self.state = UploadState::Failed(e.user_message(UPLOAD_FALLBACK));
                Err(e)
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Object key for a user's file: `<user id>/<uuid>-<sanitized name>`.
#[must_use]
pub fn object_path(user_id: Uuid, file_name: &str) -> String {
    let clean: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '-' })
        .collect();
    let clean = clean.trim_matches('-');
    let clean = if clean.is_empty() { "file" } else { clean };
    format!("{user_id}/{}-{clean}", Uuid::new_v4().simple())
}

/// Content type inferred from the file extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
