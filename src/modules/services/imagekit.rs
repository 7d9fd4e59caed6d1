//! Image hosting through the ImageKit upload API.

use crate::config::ImageKitConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Transformation applied to every blog cover: automatic quality, WebP,
/// 1280px wide.
pub const OPTIMIZE_TRANSFORM: &str = "q-auto:f-webp:w-1280";

/// Folder that blog covers are uploaded into.
pub const BLOG_IMAGE_FOLDER: &str = "/blogs";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub file_id: String,
    pub file_path: String,
}

/// Where uploaded blog images are stored and served from.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(
        &self,
        file: Vec<u8>,
        file_name: &str,
        folder: &str,
    ) -> Result<UploadedImage, ServiceError>;

    /// Public URL of the optimized rendition of a stored file.
    fn optimized_url(&self, file_path: &str) -> String;
}

pub struct ImageKit {
    client: Client,
    config: ImageKitConfig,
}

impl ImageKit {
    pub fn new(client: Client, config: ImageKitConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ImageHost for ImageKit {
    async fn upload(
        &self,
        file: Vec<u8>,
        file_name: &str,
        folder: &str,
    ) -> Result<UploadedImage, ServiceError> {
        if self.config.private_key.is_empty() {
            return Err(ServiceError::NotConfigured("ImageKit"));
        }

        let form = Form::new()
            .part("file", Part::bytes(file).file_name(file_name.to_string()))
            .text("fileName", file_name.to_string())
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&self.config.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                service: "ImageKit",
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadedImage = response.json().await?;
        log::info!(
            "Uploaded image {} as {} ({})",
            file_name, uploaded.file_path, uploaded.file_id
        );
        Ok(uploaded)
    }

    fn optimized_url(&self, file_path: &str) -> String {
        transformed_url(&self.config.url_endpoint, file_path, OPTIMIZE_TRANSFORM)
    }
}

/// `{endpoint}/tr:{transform}/{path}`
pub fn transformed_url(endpoint: &str, file_path: &str, transform: &str) -> String {
    format!(
        "{}/tr:{}/{}",
        endpoint.trim_end_matches('/'),
        transform,
        file_path.trim_start_matches('/')
    )
}
