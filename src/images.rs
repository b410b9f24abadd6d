//! # Hosted Image Cleanup
//!
//! Event and artist pictures live at an external image host. When an event is
//! purged its images are destroyed there as well.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::ImageHostConfig;
use crate::models::Image;

/// Errors returned by image host operations
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image host rejected destroy of '{public_id}' with status {status}: {body}")]
    Rejected {
        public_id: String,
        status: u16,
        body: String,
    },
    #[error("image host returned unexpected result '{result}' for '{public_id}'")]
    UnexpectedResult { public_id: String, result: String },
}

/// Remote image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Destroys one image. Destroying an image that no longer exists succeeds.
    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError>;
}

/// Store used when no image host is configured; every destroy succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopImageStore;

#[async_trait]
impl ImageStore for NoopImageStore {
    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError> {
        tracing::debug!(public_id, "Image host not configured; skipping destroy");
        Ok(())
    }
}

/// Cloudinary-compatible upload API client
pub struct CloudinaryImageStore {
    client: Client,
    config: ImageHostConfig,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    pub fn new(config: ImageHostConfig) -> Result<Self, ImageStoreError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, config })
    }

    fn destroy_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/destroy",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Hex SHA-256 over the alphabetically ordered `key=value` pairs joined with
/// `&`, immediately followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.destroy_url())
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageStoreError::Rejected {
                public_id: public_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let DestroyResponse { result } = response.json().await?;
        match result.as_str() {
            "ok" | "not found" => Ok(()),
            _ => Err(ImageStoreError::UnexpectedResult {
                public_id: public_id.to_string(),
                result,
            }),
        }
    }
}

/// Builds the store for the configured image host, or a no-op store.
pub fn image_store_from_config(
    config: Option<&ImageHostConfig>,
) -> Result<Arc<dyn ImageStore>, ImageStoreError> {
    match config {
        Some(config) => Ok(Arc::new(CloudinaryImageStore::new(config.clone())?)),
        None => Ok(Arc::new(NoopImageStore)),
    }
}

/// Best-effort removal of `images` from the host. Returns how many were
/// destroyed; failures are logged and counted, never returned.
pub async fn destroy_all(store: &dyn ImageStore, images: &[Image]) -> usize {
    let mut destroyed = 0;
    for public_id in images.iter().filter_map(|image| image.public_id.as_deref()) {
        match store.destroy(public_id).await {
            Ok(()) => {
                destroyed += 1;
                counter!("image_destroy_total", "outcome" => "ok").increment(1);
            }
            Err(err) => {
                counter!("image_destroy_total", "outcome" => "error").increment(1);
                tracing::warn!(public_id, error = %err, "Failed to destroy hosted image");
            }
        }
    }
    destroyed
}
