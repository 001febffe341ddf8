use std::sync::Arc;

use crate::config::{Config, OAuthConfig};
use crate::services::image_service::{image_vendor_from_config, ImageVendor};
use crate::services::llm_service::{ChatVendor, GroqChatClient};

/// Shared per-worker state. Relays are stateless; this only holds vendor handles.
#[derive(Clone)]
pub struct AppState {
    pub chat_vendor: Arc<dyn ChatVendor>,
    pub image_vendor: Arc<dyn ImageVendor>,
    pub oauth: Option<OAuthConfig>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        AppState {
            chat_vendor: Arc::new(GroqChatClient::new(config.chat.clone())),
            image_vendor: image_vendor_from_config(&config.image),
            oauth: config.oauth.clone(),
        }
    }
}
