use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{error, info, warn};
use rand::seq::SliceRandom;

use crate::client::history::BoundedHistory;
use crate::client::relay::{ClientError, ImageTransport};
use crate::client::scope::{
    ScopedStore, IMAGE_CURRENT_KEY, IMAGE_HISTORY_KEY, IMAGE_PROMPT_KEY, IMAGE_RECENT_KEY,
};
use crate::client::store::KeyValueStore;
use crate::config::{IMAGE_HISTORY_LIMIT, RATE_LIMIT_MESSAGE, RECENT_IMAGE_LIMIT};
use crate::models::data_uri::{self, DataUriError};
use crate::models::generation::GenerationRecord;

pub const RANDOM_PROMPTS: [&str; 20] = [
    "A futuristic city floating in the clouds at sunset",
    "A cyberpunk samurai in neon-lit rain",
    "A magical forest with glowing mushrooms and fireflies",
    "An astronaut riding a horse on Mars landscape",
    "A robot chef making sushi in a Tokyo restaurant",
    "A surreal dreamscape with melting clocks and floating islands",
    "A castle made of crystal in a desert oasis",
    "An underwater library with glowing books and sea creatures",
    "A panda astronaut floating in colorful nebula",
    "A dragon flying over a neon cyberpunk skyline",
    "A Viking longship sailing through the stars",
    "A phoenix reborn in a thunderstorm with lightning",
    "An alien marketplace on a distant moon surface",
    "A steampunk owl with brass mechanical wings",
    "A haunted Victorian mansion on a cliff during storm",
    "A futuristic race between hovercrafts over lava",
    "A time traveler in medieval village with modern gadgets",
    "A floating island with waterfalls pouring into clouds",
    "A mushroom village glowing under full moonlight",
    "A desert oasis powered by solar technology panels",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioState {
    Idle,
    Generating,
    /// Idle, with an error message to show.
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("there is no image to download")]
    NoImage,

    #[error("image is not a PNG data URI: {0}")]
    InvalidImage(#[from] DataUriError),

    #[error("could not write image: {0}")]
    Io(#[from] io::Error),
}

/// Text shown to the user for a failed generation.
pub fn failure_message(error: &ClientError) -> String {
    match error {
        e if e.is_rate_limited() => RATE_LIMIT_MESSAGE.to_string(),
        ClientError::Status { error, details, .. } => format!(
            "Failed to generate image: {}. {}",
            error,
            details.as_deref().unwrap_or("")
        ),
        other => format!("Failed to generate image: {}", other),
    }
}

/// File name a download gets when no path is given.
pub fn download_file_name(index: Option<usize>) -> String {
    let millis = Utc::now().timestamp_millis();
    match index {
        Some(index) => format!("ai-generated-image-{}-{}.png", index, millis),
        None => format!("ai-generated-image-{}.png", millis),
    }
}

/// One identity's image generator: the prompt, the image on display, and two
/// bounded galleries, all mirrored into the store.
pub struct ImageStudio<S> {
    store: ScopedStore<S>,
    prompt: String,
    current: Option<String>,
    recent: BoundedHistory<String>,
    history: BoundedHistory<GenerationRecord>,
    state: StudioState,
    error: Option<String>,
}

impl<S: KeyValueStore> ImageStudio<S> {
    pub fn open(store: ScopedStore<S>) -> Self {
        let prompt = store.load::<String>(IMAGE_PROMPT_KEY).unwrap_or_default();
        let current = store
            .load::<String>(IMAGE_CURRENT_KEY)
            .filter(|image| !image.is_empty());
        let recent = BoundedHistory::from_vec(
            store.load(IMAGE_RECENT_KEY).unwrap_or_default(),
            RECENT_IMAGE_LIMIT,
        );
        let history = BoundedHistory::from_vec(
            store.load(IMAGE_HISTORY_KEY).unwrap_or_default(),
            IMAGE_HISTORY_LIMIT,
        );
        ImageStudio {
            store,
            prompt,
            current,
            recent,
            history,
            state: StudioState::Idle,
            error: None,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn recent(&self) -> &BoundedHistory<String> {
        &self.recent
    }

    pub fn history(&self) -> &BoundedHistory<GenerationRecord> {
        &self.history
    }

    pub fn state(&self) -> StudioState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.store.persist(IMAGE_PROMPT_KEY, &self.prompt);
    }

    pub fn random_prompt(&mut self) -> &str {
        let pick = RANDOM_PROMPTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(RANDOM_PROMPTS[0]);
        self.set_prompt(pick);
        &self.prompt
    }

    /// Generates an image for the current prompt. Returns false when the
    /// prompt is blank or a generation is already running.
    pub async fn generate<T: ImageTransport + ?Sized>(&mut self, transport: &T) -> bool {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() || self.state == StudioState::Generating {
            return false;
        }

        self.state = StudioState::Generating;
        self.error = None;
        self.set_current(None);

        match transport.generate_image(&prompt).await {
            Ok(image) => {
                info!("Generated image for prompt {:?}", prompt);
                self.set_current(Some(image.clone()));
                self.recent.push(image.clone());
                self.history.push(GenerationRecord::new(image, prompt));
                self.store.persist(IMAGE_RECENT_KEY, &self.recent);
                self.store.persist(IMAGE_HISTORY_KEY, &self.history);
                self.state = StudioState::Idle;
            }
            Err(e) => {
                error!("Image generation failed: {}", e);
                self.error = Some(failure_message(&e));
                self.state = StudioState::Error;
            }
        }
        true
    }

    /// Shows a recent image again without a new generation.
    pub fn select_recent(&mut self, index: usize) -> bool {
        match self.recent.get(index).cloned() {
            Some(image) => {
                self.set_current(Some(image));
                true
            }
            None => false,
        }
    }

    pub fn select_history(&mut self, index: usize) -> bool {
        match self.history.get(index).map(|record| record.image.clone()) {
            Some(image) => {
                self.set_current(Some(image));
                true
            }
            None => false,
        }
    }

    /// The prompt that produced `image`, falling back to the prompt being edited.
    pub fn prompt_for(&self, image: &str) -> &str {
        self.history
            .iter()
            .find(|record| record.image == image)
            .map(|record| record.prompt.as_str())
            .unwrap_or(self.prompt.as_str())
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.current.as_deref().map(|image| self.prompt_for(image))
    }

    /// Writes the current image to `path`, or to a generated name in the working directory.
    pub fn download(&self, path: Option<&Path>) -> Result<PathBuf, DownloadError> {
        let image = self.current.as_deref().ok_or(DownloadError::NoImage)?;
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(download_file_name(None)),
        };
        write_image(image, &target)
    }

    /// Writes recent image `index` into `dir`.
    pub fn download_recent(&self, index: usize, dir: &Path) -> Result<PathBuf, DownloadError> {
        let image = self.recent.get(index).ok_or(DownloadError::NoImage)?;
        write_image(image, &dir.join(download_file_name(Some(index))))
    }

    fn set_current(&mut self, image: Option<String>) {
        self.current = image;
        match &self.current {
            Some(image) => self.store.persist(IMAGE_CURRENT_KEY, image),
            None => self.store.forget(IMAGE_CURRENT_KEY),
        }
    }
}

fn write_image(image: &str, target: &Path) -> Result<PathBuf, DownloadError> {
    let bytes = data_uri::decode(image)?;
    fs::write(target, bytes).map_err(|e| {
        warn!("Error writing {}: {}", target.display(), e);
        e
    })?;
    info!("Saved image to {}", target.display());
    Ok(target.to_path_buf())
}
