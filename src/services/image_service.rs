use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::{ImageProvider, ImageVendorConfig, STABILITY_MODEL, STABILITY_OUTPUT_FORMAT};
use crate::error::RelayError;
use crate::models::data_uri;

/// A successful generation, already normalised to a PNG data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data_uri: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageVendor: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, RelayError>;
}

pub fn image_vendor_from_config(config: &ImageVendorConfig) -> Arc<dyn ImageVendor> {
    match config.provider {
        ImageProvider::Stability => Arc::new(StabilityClient::new(
            config.stability_url.clone(),
            config.stability_api_key.clone(),
        )),
        ImageProvider::HuggingFace => Arc::new(HuggingFaceClient::new(
            config.huggingface_url.clone(),
            config.huggingface_api_key.clone(),
        )),
    }
}

/// Stability AI: multipart request, JSON response carrying a base64 image.
pub struct StabilityClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl StabilityClient {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        StabilityClient {
            http: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl ImageVendor for StabilityClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, RelayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::vendor(None, "Stability API key is not configured", None))?;

        let form = reqwest::multipart::Form::new()
            .text("prompt", prompt.to_string())
            .text("model", STABILITY_MODEL)
            .text("output_format", STABILITY_OUTPUT_FORMAT);

        info!("Requesting image from Stability ({} chars of prompt)", prompt.len());
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            // JSON with base64 instead of raw binary
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Error from Stability AI ({}): {}", status, body);
            return Err(stability_error(status, &body));
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            RelayError::vendor(None, "Image provider returned invalid JSON", Some(e.to_string()))
        })?;
        parse_stability_image(&json)
    }
}

fn stability_error(status: StatusCode, body: &str) -> RelayError {
    let payload: Value = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| payload.get("errors").and_then(|e| e.get(0)).and_then(Value::as_str))
        .or_else(|| payload.get("name").and_then(Value::as_str))
        .unwrap_or("Image provider error")
        .to_string();
    RelayError::vendor(Some(status.as_u16()), message, Some(payload.to_string()))
}

fn parse_stability_image(json: &Value) -> Result<GeneratedImage, RelayError> {
    json.get("image")
        .and_then(Value::as_str)
        .filter(|payload| !payload.is_empty())
        .map(|payload| GeneratedImage {
            data_uri: data_uri::png_from_base64(payload),
        })
        .ok_or_else(|| RelayError::vendor(None, "Image provider returned no image", None))
}

/// Hugging Face inference: JSON request, raw image bytes in the response.
pub struct HuggingFaceClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        HuggingFaceClient {
            http: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl ImageVendor for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, RelayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::vendor(None, "Hugging Face API key is not configured", None))?;

        info!("Requesting image from Hugging Face ({} chars of prompt)", prompt.len());
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error from Hugging Face ({}): {}", status, body);
            return Err(RelayError::vendor(
                Some(status.as_u16()),
                "Hugging Face API error",
                Some(body),
            ));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RelayError::vendor(None, "Image provider returned no image", None));
        }
        Ok(GeneratedImage {
            data_uri: data_uri::png_from_bytes(&bytes),
        })
    }
}
