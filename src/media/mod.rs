//! Remote image hosting.
//!
//! Handlers only see the [`MediaHost`] trait. [`create_media_host`] picks the
//! Cloudinary client when credentials are configured and a host that refuses every
//! call otherwise.

mod cloudinary;

pub use cloudinary::CloudinaryHost;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;

/// Upload size limit per image.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of images in one upload request.
pub const MAX_IMAGES_PER_REQUEST: usize = 10;

/// A stored image as reported by the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    pub width: i64,
    pub height: i64,
    pub format: String,
}

/// Errors from the media host layer.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media host is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The media host returned a non-2xx status code.
    #[error("media host API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The media host answered 2xx with a body we could not use.
    #[error("unexpected media host response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, MediaError>;

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store one image under `folder`.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<UploadedMedia>;

    /// Remove an image. An empty `public_id` deletes nothing.
    async fn delete(&self, public_id: &str) -> Result<()>;
}

/// Build the media host for this configuration.
pub fn create_media_host(config: &Config) -> Arc<dyn MediaHost> {
    match &config.media {
        Some(media) => Arc::new(CloudinaryHost::new(media.clone())),
        None => {
            tracing::warn!(
                "Media host is not configured (CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET). Uploads will fail!"
            );
            Arc::new(DisabledMediaHost)
        }
    }
}

/// Stand-in used when no credentials are configured.
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _content_type: &str,
        _folder: &str,
    ) -> Result<UploadedMedia> {
        Err(MediaError::NotConfigured)
    }

    async fn delete(&self, _public_id: &str) -> Result<()> {
        Err(MediaError::NotConfigured)
    }
}

/// Delete remote images without failing the caller.
///
/// Used after the owning record is already gone or replaced.
pub async fn delete_best_effort<'a, I>(host: &dyn MediaHost, public_ids: I)
where
    I: IntoIterator<Item = &'a str>,
{
    for public_id in public_ids {
        if public_id.is_empty() {
            continue;
        }
        if let Err(e) = host.delete(public_id).await {
            tracing::warn!(public_id, error = %e, "Failed to delete remote image");
        }
    }
}
