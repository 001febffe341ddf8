use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use hashbot::client::relay::{ClientError, ImageTransport};

/// Answers image requests from a queue, recording each prompt.
pub struct QueuedImages {
    pub answers: Mutex<VecDeque<Result<String, ClientError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl QueuedImages {
    pub fn new(answers: Vec<Result<String, ClientError>>) -> Self {
        QueuedImages {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `count` distinct successful images.
    pub fn successes(count: usize) -> Self {
        Self::new((0..count).map(|i| Ok(png(i))).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

pub fn png(i: usize) -> String {
    hashbot::models::data_uri::png_from_bytes(format!("image-{}", i).as_bytes())
}

#[async_trait]
impl ImageTransport for QueuedImages {
    async fn generate_image(&self, prompt: &str) -> Result<String, ClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no more answers".into())))
    }
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hashbot-{}-{}", name, uuid::Uuid::new_v4()))
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
