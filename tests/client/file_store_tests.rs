use hashbot::client::scope::{IdentityScope, ScopedStore, IMAGE_PROMPT_KEY};
use hashbot::client::store::{FileStore, KeyValueStore};

use crate::fakes::temp_path;

#[test]
fn values_survive_reopening_the_file() {
    let path = temp_path("store.json");
    {
        let store = FileStore::open(&path).unwrap();
        store.set("anonymous_image-prompt", "\"a cat\"".to_string()).unwrap();
        store.set("doomed", "1".to_string()).unwrap();
        store.remove("doomed").unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("doomed").unwrap(), None);
    let scoped = ScopedStore::new(reopened, IdentityScope::Anonymous);
    assert_eq!(scoped.load::<String>(IMAGE_PROMPT_KEY).as_deref(), Some("a cat"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_opens_empty_and_corrupt_file_is_an_error() {
    let path = temp_path("missing.json");
    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("anything").unwrap(), None);
    assert!(!path.exists());

    let corrupt = temp_path("corrupt.json");
    std::fs::write(&corrupt, "{ nope").unwrap();
    assert!(FileStore::open(&corrupt).is_err());
    std::fs::remove_file(&corrupt).ok();
}
