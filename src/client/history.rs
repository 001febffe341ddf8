use std::collections::VecDeque;

use serde::Serialize;

/// Most-recent-first sequence capped at `limit`; inserting past the cap drops the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    limit: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(limit: usize) -> Self {
        BoundedHistory {
            items: VecDeque::with_capacity(limit.min(128)),
            limit,
        }
    }

    /// Rebuilds from a persisted most-recent-first list, enforcing the cap.
    pub fn from_vec(items: Vec<T>, limit: usize) -> Self {
        let mut items: VecDeque<T> = items.into();
        items.truncate(limit);
        BoundedHistory { items, limit }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedHistory<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}
