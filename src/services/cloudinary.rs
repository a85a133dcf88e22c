use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::CloudinaryConfig;
use crate::domain::models::media::{MediaError, UploadOptions, UploadedMedia};
use crate::domain::services::media::MediaUploader;

pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{action}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Adds `timestamp`, `api_key` and `signature` to the signed `params`.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> Form {
        params.insert("timestamp", Utc::now().timestamp().to_string());

        let signature = signature(&params, &self.config.api_secret);

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));

        form.text("api_key", self.config.api_key.clone())
            .text("signature", signature)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        form: Form,
    ) -> Result<T, MediaError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);

            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(
        &self,
        file: &Path,
        options: UploadOptions,
    ) -> Result<UploadedMedia, MediaError> {
        let bytes = tokio::fs::read(file).await.map_err(|source| MediaError::Read {
            path: file.display().to_string(),
            source,
        })?;

        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| options.public_id.clone());

        let params = BTreeMap::from([
            ("folder", options.folder),
            ("overwrite", options.overwrite.to_string()),
            ("public_id", options.public_id),
        ]);

        let form = self
            .signed(params)
            .part("file", Part::bytes(bytes).file_name(file_name));

        let uploaded: UploadResponse = self.send("upload", form).await?;

        tracing::debug!(public_id = %uploaded.public_id, "media uploaded");

        Ok(UploadedMedia {
            secure_url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let params = BTreeMap::from([("public_id", public_id.to_string())]);

        let _: serde_json::Value = self.send("destroy", self.signed(params)).await?;

        Ok(())
    }
}

/// Serializes `params` as sorted `key=value` pairs joined by `&`.
fn serialize_params(params: &BTreeMap<&'static str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn signature(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(serialize_params(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
