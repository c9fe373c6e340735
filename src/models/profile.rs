use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Per-user record of everything they have interacted with, grouped by
/// interaction kind. Rebuilt wholesale from the store and cached for a short
/// window; never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionProfile {
    pub likes: HashSet<Uuid>,
    pub comments: HashSet<Uuid>,
    pub shares: HashSet<Uuid>,
    pub views: HashSet<Uuid>,
    pub follows: HashSet<Uuid>,
    pub joins: HashSet<Uuid>,
    /// Last interaction instant per entity, across all kinds.
    pub timestamps: HashMap<Uuid, DateTime<Utc>>,
}

impl InteractionProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interaction, keeping the most recent timestamp per entity.
    pub fn record(&mut self, entity_id: Uuid, at: DateTime<Utc>) {
        match self.timestamps.get(&entity_id) {
            Some(existing) if *existing >= at => {}
            _ => {
                self.timestamps.insert(entity_id, at);
            }
        }
    }

    /// True when no interaction of any kind has been observed.
    pub fn is_empty(&self) -> bool {
        self.likes.is_empty()
            && self.comments.is_empty()
            && self.shares.is_empty()
            && self.views.is_empty()
            && self.follows.is_empty()
            && self.joins.is_empty()
    }
}
