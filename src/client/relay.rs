use async_stream::stream;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use log::{debug, warn};
use serde_json::{json, Value};
use url::Url;

use crate::client::utf8::Utf8StreamDecoder;
use crate::models::chat_message::ChatMessage;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("relay answered {status}: {error}")]
    Status {
        status: u16,
        error: String,
        details: Option<String>,
    },

    #[error("could not decode relay response: {0}")]
    Decode(String),

    #[error("stream ended abnormally: {0}")]
    Stream(String),
}

impl ClientError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::Status { status: 429, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error.to_string())
    }
}

/// Assistant text in the order the relay produced it.
pub type FragmentStream = BoxStream<'static, Result<String, ClientError>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open_chat(&self, history: &[ChatMessage]) -> Result<FragmentStream, ClientError>;
}

#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Returns the generated image as a data URI.
    async fn generate_image(&self, prompt: &str) -> Result<String, ClientError>;
}

/// Talks to a running HashBot server.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|e| ClientError::Transport(format!("invalid base URL {}: {}", base_url, e)))?;
        Ok(RelayClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns a non-success response into a `Status` error, reading the JSON envelope if there is one.
async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let envelope: Option<Value> = serde_json::from_str(&body).ok();
    let error = envelope
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| if body.is_empty() { format!("HTTP {}", status) } else { body.clone() });
    let details = envelope
        .as_ref()
        .and_then(|v| v.get("details"))
        .and_then(Value::as_str)
        .map(String::from);
    ClientError::Status { status, error, details }
}

#[async_trait]
impl ChatTransport for RelayClient {
    async fn open_chat(&self, history: &[ChatMessage]) -> Result<FragmentStream, ClientError> {
        let response = self.http.post(self.endpoint("/api/chat")).json(history).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let mut bytes = Box::pin(response.bytes_stream());
        let fragments = stream! {
            let mut decoder = Utf8StreamDecoder::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        let text = decoder.push(&chunk);
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(e) => {
                        warn!("Chat stream broke: {}", e);
                        yield Err(ClientError::Stream(e.to_string()));
                        return;
                    }
                }
            }
            let tail = decoder.finish();
            if !tail.is_empty() {
                yield Ok(tail);
            }
            debug!("Chat stream closed");
        };
        Ok(Box::pin(fragments))
    }
}

#[async_trait]
impl ImageTransport for RelayClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/api/generate-image"))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: Value = response.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        body.get("image")
            .and_then(Value::as_str)
            .filter(|image| !image.is_empty())
            .map(String::from)
            .ok_or_else(|| ClientError::Decode("response carries no image".to_string()))
    }
}
