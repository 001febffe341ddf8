use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use log::{debug, error, info};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{ChatVendorConfig, SYSTEM_PROMPT};
use crate::error::RelayError;
use crate::models::chat_message::{ChatMessage, Role};
use crate::services::sse::{SseDecoder, SseEvent};

/// Ordered text deltas as the vendor produced them.
pub type DeltaStream = BoxStream<'static, Result<String, RelayError>>;

/// A turn in the vendor's wire format, which also allows the system role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorMessage {
    pub role: &'static str,
    pub content: String,
}

/// Prepends the fixed system instruction to the caller's history.
pub fn build_conversation(history: &[ChatMessage]) -> Vec<VendorMessage> {
    let mut conversation = Vec::with_capacity(history.len() + 1);
    conversation.push(VendorMessage {
        role: "system",
        content: SYSTEM_PROMPT.to_string(),
    });
    conversation.extend(history.iter().map(|message| VendorMessage {
        role: match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: message.content.clone(),
    }));
    conversation
}

#[async_trait]
pub trait ChatVendor: Send + Sync {
    /// Starts a streamed completion. Errors before the first byte are returned
    /// directly; later failures arrive as an `Err` item and end the stream.
    async fn stream_chat(&self, messages: Vec<VendorMessage>) -> Result<DeltaStream, RelayError>;
}

/// OpenAI-compatible chat completions client (Groq).
pub struct GroqChatClient {
    http: reqwest::Client,
    config: ChatVendorConfig,
}

impl GroqChatClient {
    pub fn new(config: ChatVendorConfig) -> Self {
        GroqChatClient {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatVendor for GroqChatClient {
    async fn stream_chat(&self, messages: Vec<VendorMessage>) -> Result<DeltaStream, RelayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::vendor(None, "Groq API key is not configured", None))?;

        let url = format!("{}/chat/completions", self.config.base_url);
        info!("Requesting streamed completion from {} ({} turns)", self.config.model, messages.len());
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": messages,
                "stream": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat provider returned {}: {}", status, body);
            return Err(RelayError::vendor(
                Some(status.as_u16()),
                vendor_error_message(&body).unwrap_or_else(|| "Chat provider error".to_string()),
                Some(body),
            ));
        }

        Ok(deltas_from_bytes(response.bytes_stream()))
    }
}

fn vendor_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .map(String::from)
}

/// Turns a raw SSE byte stream into text deltas. A stream that stops without the
/// `[DONE]` marker is reported as an error rather than a clean end.
pub fn deltas_from_bytes<S, E>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let deltas = stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = SseDecoder::new();
        let mut done = false;

        'read: while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(RelayError::Stream(e.to_string()));
                    return;
                }
            };
            for event in decoder.push(&chunk) {
                match event {
                    SseEvent::Delta(text) => yield Ok(text),
                    SseEvent::Done => {
                        done = true;
                        break 'read;
                    }
                    SseEvent::Error(message) => {
                        yield Err(RelayError::Stream(message));
                        return;
                    }
                }
            }
        }

        if !done {
            match decoder.finish() {
                Some(SseEvent::Delta(text)) => yield Ok(text),
                Some(SseEvent::Done) => done = true,
                Some(SseEvent::Error(message)) => {
                    yield Err(RelayError::Stream(message));
                    return;
                }
                None => {}
            }
        }

        if done {
            debug!("Vendor stream completed");
        } else {
            yield Err(RelayError::Stream("vendor stream ended before completion".to_string()));
        }
    };
    Box::pin(deltas)
}
