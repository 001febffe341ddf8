use hashbot::client::chat::ChatSession;
use hashbot::client::image::ImageStudio;
use hashbot::client::scope::{IdentityScope, IdentityWatcher, ScopedStore};
use hashbot::client::store::MemoryStore;
use hashbot::config::GREETING;

use crate::fakes::{init_logging, QueuedImages};

fn alice() -> IdentityScope {
    IdentityScope::User("alice".into())
}

async fn populate(store: &MemoryStore) {
    let scoped = ScopedStore::new(store.clone(), alice());
    let mut chat = ChatSession::open(scoped.clone());
    chat.begin("remember me");
    chat.finish();

    let mut studio = ImageStudio::open(scoped);
    studio.set_prompt("a red balloon");
    assert!(studio.generate(&QueuedImages::successes(1)).await);
}

#[tokio::test]
async fn logout_clears_the_previous_users_keys() {
    init_logging();
    let store = MemoryStore::new();
    let watcher = IdentityWatcher::new(store.clone());
    assert_eq!(watcher.observe(&alice()).unwrap(), None);
    populate(&store).await;
    assert!(store.keys().iter().any(|k| k.starts_with("user_alice_")));

    let cleared = watcher.observe(&IdentityScope::Anonymous).unwrap();
    assert_eq!(cleared, Some(alice()));
    assert!(store.keys().iter().all(|k| !k.starts_with("user_alice_")));
}

#[tokio::test]
async fn a_different_user_never_sees_previous_history() {
    let store = MemoryStore::new();
    let watcher = IdentityWatcher::new(store.clone());
    watcher.observe(&alice()).unwrap();
    populate(&store).await;

    let bob = IdentityScope::User("bob".into());
    watcher.observe(&bob).unwrap();
    let scoped = ScopedStore::new(store.clone(), bob);
    let chat = ChatSession::open(scoped.clone());
    let studio = ImageStudio::open(scoped);

    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].content, GREETING);
    assert!(studio.recent().is_empty());
    assert!(studio.history().is_empty());
    assert_eq!(studio.prompt(), "");
}

#[tokio::test]
async fn same_user_keeps_history_across_runs() {
    let store = MemoryStore::new();
    IdentityWatcher::new(store.clone()).observe(&alice()).unwrap();
    populate(&store).await;

    assert_eq!(IdentityWatcher::new(store.clone()).observe(&alice()).unwrap(), None);
    let studio = ImageStudio::open(ScopedStore::new(store, alice()));
    assert_eq!(studio.recent().len(), 1);
    assert_eq!(studio.prompt(), "a red balloon");
}

#[test]
fn anonymous_data_is_left_alone_on_sign_in() {
    let store = MemoryStore::new();
    let watcher = IdentityWatcher::new(store.clone());
    watcher.observe(&IdentityScope::Anonymous).unwrap();
    ScopedStore::new(store.clone(), IdentityScope::Anonymous).persist("image-prompt", "kept");

    assert_eq!(watcher.observe(&alice()).unwrap(), None);
    assert!(store.contains_key("anonymous_image-prompt"));
}
