use std::sync::Arc;
use uuid::Uuid;

use crate::db::{GroupStore, PostStore, UserStore};
use crate::models::InteractionProfile;
use crate::services::cache::EngineCaches;

/// Rebuilds interaction profiles from the store on demand.
///
/// Each interaction category is fetched independently and fails soft: a store
/// error leaves that category empty and degrades recommendation quality
/// instead of failing the whole pipeline. The resulting profile is cached for
/// a short window and always replaced wholesale, never patched.
pub struct ProfileBuilder {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    posts: Arc<dyn PostStore>,
    caches: EngineCaches,
}

impl ProfileBuilder {
    pub fn new(
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        posts: Arc<dyn PostStore>,
        caches: EngineCaches,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            caches,
        }
    }

    /// Returns the user's interaction profile, from cache when fresh.
    pub async fn build(&self, user_id: Uuid) -> InteractionProfile {
        if let Some(cached) = self.caches.profiles.get(&user_id).await {
            tracing::debug!(user_id = %user_id, "Profile cache hit");
            return cached;
        }

        let profile = self.build_uncached(user_id).await;
        self.caches.profiles.insert(user_id, profile.clone()).await;
        profile
    }

    async fn build_uncached(&self, user_id: Uuid) -> InteractionProfile {
        let mut profile = InteractionProfile::new();

        match self.posts.liked_entity_ids(user_id).await {
            Ok(rows) => {
                for (entity_id, at) in rows {
                    profile.likes.insert(entity_id);
                    profile.record(entity_id, at);
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load likes, leaving empty");
            }
        }

        match self.posts.commented_entity_ids(user_id).await {
            Ok(rows) => {
                for (entity_id, at) in rows {
                    profile.comments.insert(entity_id);
                    profile.record(entity_id, at);
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load comments, leaving empty");
            }
        }

        match self.posts.shared_entity_ids(user_id).await {
            Ok(rows) => {
                for (entity_id, at) in rows {
                    profile.shares.insert(entity_id);
                    profile.record(entity_id, at);
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load shares, leaving empty");
            }
        }

        match self.users.connections_of(user_id).await {
            Ok(connections) => {
                for connection in connections {
                    let peer = connection.other_side(user_id);
                    profile.follows.insert(peer);
                    profile.record(peer, connection.accepted_at);
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load connections, leaving empty");
            }
        }

        match self.groups.member_group_ids(user_id).await {
            Ok(group_ids) => {
                profile.joins.extend(group_ids);
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load memberships, leaving empty");
            }
        }

        tracing::debug!(
            user_id = %user_id,
            likes = profile.likes.len(),
            comments = profile.comments.len(),
            follows = profile.follows.len(),
            joins = profile.joins.len(),
            "Built interaction profile"
        );

        profile
    }
}
