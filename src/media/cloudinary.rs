//! Cloudinary upload API client using signed requests.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaError, MediaHost, Result, UploadedMedia};
use crate::config::MediaConfig;

const DEFAULT_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Resize large originals and let the CDN pick quality and format.
const UPLOAD_TRANSFORMATION: &str = "c_limit,h_1200,w_1200/q_auto/f_auto";

pub struct CloudinaryHost {
    client: reqwest::Client,
    api_url: String,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    width: i64,
    #[serde(default)]
    height: i64,
    #[serde(default)]
    format: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryHost {
    pub fn new(config: MediaConfig) -> Self {
        Self::with_api_url(config, DEFAULT_API_URL.to_string())
    }

    /// Point the client at another API root, e.g. a local stub.
    pub fn with_api_url(config: MediaConfig, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.api_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MediaError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

/// Sign request parameters: `k=v` pairs sorted by key, joined with `&`, followed by the
/// API secret, hashed with SHA-1.
pub(crate) fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<UploadedMedia> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", folder),
                ("timestamp", &timestamp),
                ("transformation", UPLOAD_TRANSFORMATION),
            ],
            &self.config.api_secret,
        );

        let file = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("transformation", UPLOAD_TRANSFORMATION)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        tracing::info!(public_id = %uploaded.public_id, "Uploaded image");

        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            width: uploaded.width,
            height: uploaded.height,
            format: uploaded.format,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        if public_id.is_empty() {
            return Ok(());
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.config.api_key.clone()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        // "not found" is fine: the image is gone either way
        match destroyed.result.as_str() {
            "ok" | "not found" => {
                tracing::info!(public_id, result = %destroyed.result, "Deleted image");
                Ok(())
            }
            other => Err(MediaError::InvalidResponse(format!(
                "destroy returned {:?}",
                other
            ))),
        }
    }
}
