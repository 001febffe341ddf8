use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished image generation, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub image: String,
    pub prompt: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn new(image: impl Into<String>, prompt: impl Into<String>) -> Self {
        GenerationRecord {
            image: image.into(),
            prompt: prompt.into(),
            timestamp: Utc::now(),
        }
    }
}
