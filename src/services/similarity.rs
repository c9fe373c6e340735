use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{GroupStore, PostStore};
use crate::services::cache::{EngineCaches, PairKey};
use crate::services::profile::ProfileBuilder;
use crate::services::signals::jaccard;

/// Per-category weights blended into the pairwise similarity score.
pub const LIKES_WEIGHT: f64 = 0.30;
pub const COMMENTS_WEIGHT: f64 = 0.25;
pub const FOLLOWS_WEIGHT: f64 = 0.15;
pub const JOINS_WEIGHT: f64 = 0.10;
/// Present in the weight table but not read by the blend below; the
/// weight-sum test pins the used total so any drift here is caught.
pub const SHARES_WEIGHT: f64 = 0.20;

/// Sum of the weights the blend actually reads.
pub const USED_WEIGHT_TOTAL: f64 = LIKES_WEIGHT + COMMENTS_WEIGHT + FOLLOWS_WEIGHT + JOINS_WEIGHT;

/// Candidates pulled per behavior-graph source when pooling similar users.
const POOL_CAP_PER_SOURCE: i64 = 200;
/// Similarity floor below which a candidate is not considered similar.
const SIMILARITY_FLOOR: f64 = 0.1;

/// Computes behavior similarity between users from their interaction
/// profiles. Scores are symmetric, bounded to [0, 1], and memoized in a
/// size-bounded cache keyed by the sorted user pair.
pub struct SimilarityEngine {
    profiles: Arc<ProfileBuilder>,
    groups: Arc<dyn GroupStore>,
    posts: Arc<dyn PostStore>,
    caches: EngineCaches,
    concurrency: usize,
}

impl SimilarityEngine {
    pub fn new(
        profiles: Arc<ProfileBuilder>,
        groups: Arc<dyn GroupStore>,
        posts: Arc<dyn PostStore>,
        caches: EngineCaches,
        concurrency: usize,
    ) -> Self {
        Self {
            profiles,
            groups,
            posts,
            caches,
            concurrency,
        }
    }

    /// Pairwise similarity in [0, 1], weighted Jaccard per category.
    pub async fn similarity(&self, a: Uuid, b: Uuid) -> f64 {
        if a == b {
            return 1.0;
        }

        let key = PairKey::new(a, b);
        if let Some(cached) = self.caches.similarity.get(&key).await {
            return cached;
        }

        let profile_a = self.profiles.build(a).await;
        let profile_b = self.profiles.build(b).await;

        let score = LIKES_WEIGHT * jaccard(&profile_a.likes, &profile_b.likes)
            + COMMENTS_WEIGHT * jaccard(&profile_a.comments, &profile_b.comments)
            + FOLLOWS_WEIGHT * jaccard(&profile_a.follows, &profile_b.follows)
            + JOINS_WEIGHT * jaccard(&profile_a.joins, &profile_b.joins);

        self.caches.similarity.insert(key, score).await;
        score
    }

    /// The most behavior-similar users to `user_id`, strongest first.
    ///
    /// The candidate pool combines users who liked the same posts with users
    /// who share a group, each source capped. Scoring runs with bounded
    /// concurrency; failures shrink the pool instead of failing the call.
    pub async fn similar_users(&self, user_id: Uuid, limit: usize) -> Vec<(Uuid, f64)> {
        let mut pool: HashSet<Uuid> = HashSet::new();

        match self.posts.co_likers(user_id, POOL_CAP_PER_SOURCE).await {
            Ok(ids) => pool.extend(ids),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Co-liker pool unavailable");
            }
        }
        match self.groups.co_members(user_id, POOL_CAP_PER_SOURCE).await {
            Ok(ids) => pool.extend(ids),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Co-member pool unavailable");
            }
        }
        pool.remove(&user_id);

        if pool.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(Uuid, f64)> = stream::iter(pool.into_iter())
            .map(|candidate| async move {
                (candidate, self.similarity(user_id, candidate).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        scored.retain(|(_, score)| *score > SIMILARITY_FLOOR);
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        scored
    }
}
