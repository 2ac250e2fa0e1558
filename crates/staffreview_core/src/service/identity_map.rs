//! Session-scoped identity map for reviews.
//!
//! Holds the last persisted snapshot of each review seen by one service.
//!
//! # Invariants
//! - Only persisted reviews (with an id) are ever stored.
//! - Entries are keyed by the snapshot's own id.

use crate::model::review::{ReviewId, ReviewRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: BTreeMap<ReviewId, ReviewRecord>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot of `review`, replacing any previous entry.
    ///
    /// Returns `false` and stores nothing for transient reviews.
    pub fn register(&mut self, review: &ReviewRecord) -> bool {
        match review.id() {
            Some(id) => {
                self.entries.insert(id, review.clone());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ReviewId) -> Option<&ReviewRecord> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ReviewId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn evict(&mut self, id: ReviewId) -> Option<ReviewRecord> {
        self.entries.remove(&id)
    }

    /// Tracked ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ReviewId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
