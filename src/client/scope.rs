use std::fmt;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::store::{KeyValueStore, StorageError};
use crate::models::identity::Identity;

pub const CHAT_HISTORY_KEY: &str = "chat-history";
pub const IMAGE_PROMPT_KEY: &str = "image-prompt";
pub const IMAGE_CURRENT_KEY: &str = "image-current";
pub const IMAGE_RECENT_KEY: &str = "image-recent";
pub const IMAGE_HISTORY_KEY: &str = "image-history";

/// Every per-identity key the application writes.
pub const FEATURE_KEYS: [&str; 5] = [
    CHAT_HISTORY_KEY,
    IMAGE_PROMPT_KEY,
    IMAGE_CURRENT_KEY,
    IMAGE_RECENT_KEY,
    IMAGE_HISTORY_KEY,
];

const LAST_IDENTITY_KEY: &str = "hashbot-last-identity";

/// Whose data a key belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityScope {
    User(String),
    Anonymous,
}

impl IdentityScope {
    pub fn from_identity(identity: Option<&Identity>) -> Self {
        match identity {
            Some(identity) => IdentityScope::User(identity.user_id.clone()),
            None => IdentityScope::Anonymous,
        }
    }

    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => IdentityScope::User(id.to_string()),
            None => IdentityScope::Anonymous,
        }
    }

    pub fn key(&self, feature: &str) -> String {
        format!("{}_{}", self, feature)
    }
}

impl fmt::Display for IdentityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityScope::User(id) => write!(f, "user_{}", id),
            IdentityScope::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// A store view that can only see one identity's keys.
#[derive(Clone)]
pub struct ScopedStore<S> {
    store: S,
    scope: IdentityScope,
}

impl<S: KeyValueStore> ScopedStore<S> {
    pub fn new(store: S, scope: IdentityScope) -> Self {
        ScopedStore { store, scope }
    }

    pub fn scope(&self) -> &IdentityScope {
        &self.scope
    }

    pub fn read<T: DeserializeOwned>(&self, feature: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(&self.scope.key(feature))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, feature: &str, value: &T) -> Result<(), StorageError> {
        self.store.set(&self.scope.key(feature), serde_json::to_string(value)?)
    }

    pub fn remove(&self, feature: &str) -> Result<(), StorageError> {
        self.store.remove(&self.scope.key(feature))
    }

    /// Like `read`, but a storage failure only costs the persisted value.
    pub fn load<T: DeserializeOwned>(&self, feature: &str) -> Option<T> {
        self.read(feature).unwrap_or_else(|e| {
            warn!("Error loading {} from storage: {}", self.scope.key(feature), e);
            None
        })
    }

    /// Like `write`, but failures are logged and the in-memory state carries on.
    pub fn persist<T: Serialize + ?Sized>(&self, feature: &str, value: &T) {
        if let Err(e) = self.write(feature, value) {
            warn!("Error saving {} to storage: {}", self.scope.key(feature), e);
        }
    }

    pub fn forget(&self, feature: &str) {
        if let Err(e) = self.remove(feature) {
            warn!("Error clearing {} from storage: {}", self.scope.key(feature), e);
        }
    }
}

/// Removes every feature key belonging to `scope`.
pub fn clear_scope<S: KeyValueStore + ?Sized>(store: &S, scope: &IdentityScope) -> Result<(), StorageError> {
    for feature in FEATURE_KEYS {
        store.remove(&scope.key(feature))?;
    }
    Ok(())
}

/// Remembers which identity last used the store and wipes a signed-in user's
/// data once a different identity (or nobody) shows up.
pub struct IdentityWatcher<S> {
    store: S,
}

impl<S: KeyValueStore> IdentityWatcher<S> {
    pub fn new(store: S) -> Self {
        IdentityWatcher { store }
    }

    pub fn last_seen(&self) -> Result<Option<IdentityScope>, StorageError> {
        match self.store.get(LAST_IDENTITY_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Records `current` and returns the scope that was cleared, if any.
    pub fn observe(&self, current: &IdentityScope) -> Result<Option<IdentityScope>, StorageError> {
        let previous = self.last_seen().unwrap_or_else(|e| {
            warn!("Ignoring unreadable last identity: {}", e);
            None
        });

        let cleared = match previous {
            Some(previous @ IdentityScope::User(_)) if &previous != current => {
                info!("Identity changed from {} to {}; clearing {}", previous, current, previous);
                clear_scope(&self.store, &previous)?;
                Some(previous)
            }
            _ => None,
        };

        self.store.set(LAST_IDENTITY_KEY, serde_json::to_string(current)?)?;
        Ok(cleared)
    }
}
