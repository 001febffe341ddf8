use std::env;

use anyhow::{bail, Context};
use log::warn;
use url::Url;

pub fn init_logging() {
    init_logging_with("info");
}

/// Like `init_logging`, with a different filter when `RUST_LOG` is unset.
pub fn init_logging_with(default_filter: &str) {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));
}

pub const SYSTEM_PROMPT: &str =
    "You are HashBot, an AI assistant helping users with any questions they may have.";
pub const GREETING: &str = "Hi! I am HashBot, how can I help you today?";
pub const APOLOGY: &str = "I'm sorry, but I encountered an error. Please try again later.";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Length of the lightweight gallery of recent images.
pub const RECENT_IMAGE_LIMIT: usize = 50;
/// Length of the detailed generation history.
pub const IMAGE_HISTORY_LIMIT: usize = 100;

/// Request body ceilings for the relays. Chat histories only grow, so theirs is generous.
pub const CHAT_BODY_LIMIT: usize = 8 * 1024 * 1024;
pub const IMAGE_BODY_LIMIT: usize = 256 * 1024;

pub const CHAT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
pub const STABILITY_MODEL: &str = "sd3.5-large-turbo";
pub const STABILITY_OUTPUT_FORMAT: &str = "png";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const STABILITY_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/sd3";
const HUGGINGFACE_URL: &str =
    "https://api-inference.huggingface.co/models/ByteDance/SDXL-Lightning";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProvider {
    /// Multipart upload, base64 JSON response.
    Stability,
    /// JSON upload, raw image bytes in the response.
    HuggingFace,
}

impl ImageProvider {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stability" => Ok(ImageProvider::Stability),
            "huggingface" | "hugging-face" | "hf" => Ok(ImageProvider::HuggingFace),
            other => bail!("unknown image provider {:?}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatVendorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ImageVendorConfig {
    pub provider: ImageProvider,
    pub stability_url: String,
    pub stability_api_key: Option<String>,
    pub huggingface_url: String,
    pub huggingface_api_key: Option<String>,
}

/// Settings for the external identity provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub chat: ChatVendorConfig,
    pub image: ImageVendorConfig,
    /// `None` runs the site anonymously.
    pub oauth: Option<OAuthConfig>,
    pub session_key: Option<Vec<u8>>,
    pub secure_cookies: bool,
}

impl Config {
    /// Reads configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("HASHBOT_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("HASHBOT_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let chat = ChatVendorConfig {
            base_url: checked_url("GROQ_BASE_URL", get("GROQ_BASE_URL"), GROQ_BASE_URL)?,
            api_key: get("GROQ_API_KEY"),
            model: get("HASHBOT_CHAT_MODEL").unwrap_or_else(|| CHAT_MODEL.to_string()),
        };
        if chat.api_key.is_none() {
            warn!("GROQ_API_KEY is not set; chat requests will fail");
        }

        let provider = match get("HASHBOT_IMAGE_PROVIDER") {
            Some(raw) => ImageProvider::parse(&raw)?,
            None => ImageProvider::Stability,
        };
        let image = ImageVendorConfig {
            provider,
            stability_url: checked_url("STABILITY_URL", get("STABILITY_URL"), STABILITY_URL)?,
            stability_api_key: get("STABILITY_API_KEY"),
            huggingface_url: checked_url("HUGGINGFACE_URL", get("HUGGINGFACE_URL"), HUGGINGFACE_URL)?,
            huggingface_api_key: get("HUGGINGFACE_API_KEY"),
        };

        let oauth = match (
            get("OAUTH_CLIENT_ID"),
            get("OAUTH_CLIENT_SECRET"),
            get("OAUTH_AUTH_URL"),
            get("OAUTH_TOKEN_URL"),
            get("OAUTH_USERINFO_URL"),
            get("OAUTH_REDIRECT_URL"),
        ) {
            (Some(client_id), Some(client_secret), Some(auth_url), Some(token_url), Some(userinfo_url), Some(redirect_url)) => {
                Some(OAuthConfig {
                    client_id,
                    client_secret,
                    auth_url: checked_url("OAUTH_AUTH_URL", Some(auth_url), "")?,
                    token_url: checked_url("OAUTH_TOKEN_URL", Some(token_url), "")?,
                    userinfo_url: checked_url("OAUTH_USERINFO_URL", Some(userinfo_url), "")?,
                    redirect_url: checked_url("OAUTH_REDIRECT_URL", Some(redirect_url), "")?,
                })
            }
            _ => {
                warn!("OAuth settings incomplete; sign-in is disabled");
                None
            }
        };

        Ok(Config {
            host: get("HASHBOT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            chat,
            image,
            oauth,
            session_key: get("HASHBOT_SESSION_KEY").map(String::into_bytes),
            secure_cookies: get("HASHBOT_SECURE_COOKIES").map_or(false, |v| v == "true"),
        })
    }
}

fn checked_url(name: &str, value: Option<String>, default: &str) -> anyhow::Result<String> {
    let raw = value.unwrap_or_else(|| default.to_string());
    Url::parse(&raw).with_context(|| format!("{} is not a valid URL: {}", name, raw))?;
    Ok(raw.trim_end_matches('/').to_string())
}
