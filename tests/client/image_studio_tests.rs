use hashbot::client::image::{DownloadError, ImageStudio, StudioState};
use hashbot::client::relay::ClientError;
use hashbot::client::scope::{IdentityScope, ScopedStore};
use hashbot::client::store::MemoryStore;
use hashbot::config::RATE_LIMIT_MESSAGE;
use hashbot::models::data_uri;

use crate::fakes::{init_logging, png, temp_path, QueuedImages};

fn studio() -> (MemoryStore, ImageStudio<MemoryStore>) {
    let store = MemoryStore::new();
    let studio = ImageStudio::open(ScopedStore::new(store.clone(), IdentityScope::Anonymous));
    (store, studio)
}

#[tokio::test]
async fn galleries_stay_bounded_most_recent_first() {
    let (store, mut studio) = studio();
    let transport = QueuedImages::successes(120);
    for i in 0..120 {
        studio.set_prompt(format!("prompt {}", i));
        assert!(studio.generate(&transport).await);
    }

    assert_eq!(studio.recent().len(), 50);
    assert_eq!(studio.history().len(), 100);
    assert_eq!(studio.recent().first(), Some(&png(119)));
    assert_eq!(studio.recent().get(49), Some(&png(70)));
    assert_eq!(studio.history().first().map(|r| r.prompt.as_str()), Some("prompt 119"));
    assert_eq!(studio.history().get(99).map(|r| r.prompt.as_str()), Some("prompt 20"));

    let reopened = ImageStudio::open(ScopedStore::new(store, IdentityScope::Anonymous));
    assert_eq!(reopened.recent().len(), 50);
    assert_eq!(reopened.history().len(), 100);
    assert_eq!(reopened.current(), Some(png(119).as_str()));
}

#[tokio::test]
async fn rate_limit_is_reported_distinctly_without_touching_lists() {
    init_logging();
    let (_, mut studio) = studio();
    let transport = QueuedImages::new(vec![
        Ok(png(0)),
        Err(ClientError::Status {
            status: 429,
            error: "Too many requests".into(),
            details: None,
        }),
    ]);
    studio.set_prompt("first");
    studio.generate(&transport).await;
    studio.set_prompt("second");
    studio.generate(&transport).await;

    assert_eq!(studio.state(), StudioState::Error);
    assert_eq!(studio.error(), Some(RATE_LIMIT_MESSAGE));
    assert_eq!(studio.recent().len(), 1);
    assert_eq!(studio.history().len(), 1);
    assert_eq!(studio.current(), None);
}

#[tokio::test]
async fn generic_failure_carries_the_relay_error() {
    let (_, mut studio) = studio();
    let transport = QueuedImages::new(vec![Err(ClientError::Status {
        status: 500,
        error: "Internal server error".into(),
        details: Some("boom".into()),
    })]);
    studio.set_prompt("a red balloon");
    studio.generate(&transport).await;
    assert_eq!(studio.error(), Some("Failed to generate image: Internal server error. boom"));

    studio.set_prompt("again");
    let retry = QueuedImages::successes(1);
    studio.generate(&retry).await;
    assert_eq!(studio.state(), StudioState::Idle);
    assert_eq!(studio.error(), None);
}

#[tokio::test]
async fn blank_prompt_makes_no_call() {
    let (_, mut studio) = studio();
    let transport = QueuedImages::successes(1);
    studio.set_prompt("   ");
    assert!(!studio.generate(&transport).await);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn prompt_is_trimmed_and_selection_needs_no_call() {
    let (_, mut studio) = studio();
    let transport = QueuedImages::successes(2);
    studio.set_prompt("  a red balloon ");
    studio.generate(&transport).await;
    studio.set_prompt("a blue kite");
    studio.generate(&transport).await;
    assert_eq!(transport.prompts.lock().unwrap()[0], "a red balloon");

    assert!(studio.select_recent(1));
    assert_eq!(studio.current(), Some(png(0).as_str()));
    assert_eq!(studio.current_prompt(), Some("a red balloon"));
    assert!(studio.select_history(0));
    assert_eq!(studio.current_prompt(), Some("a blue kite"));
    assert!(!studio.select_recent(5));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn download_writes_decoded_png_bytes() {
    init_logging();
    let (_, mut studio) = studio();
    assert!(matches!(studio.download(None), Err(DownloadError::NoImage)));

    studio.set_prompt("a red balloon");
    studio.generate(&QueuedImages::successes(1)).await;

    let target = temp_path("download.png");
    let saved = studio.download(Some(&target)).unwrap();
    assert_eq!(std::fs::read(&saved).unwrap(), data_uri::decode(&png(0)).unwrap());
    std::fs::remove_file(&saved).ok();

    let dir = std::env::temp_dir();
    let saved = studio.download_recent(0, &dir).unwrap();
    let name = saved.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("ai-generated-image-0-") && name.ends_with(".png"));
    std::fs::remove_file(&saved).ok();
}

#[test]
fn random_prompt_is_persisted() {
    let (store, mut studio) = studio();
    let prompt = studio.random_prompt().to_string();
    assert!(!prompt.is_empty());
    let reopened = ImageStudio::open(ScopedStore::new(store, IdentityScope::Anonymous));
    assert_eq!(reopened.prompt(), prompt);
}
