use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use crate::models::InteractionProfile;

/// Cache key for a pairwise similarity score. The pair is stored sorted so
/// the relation stays symmetric: (a, b) and (b, a) hit the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(Uuid, Uuid);

impl PairKey {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Derived-data caches owned by one engine instance. Both hold recomputable
/// artifacts only, so dropping every entry is always safe.
#[derive(Clone)]
pub struct EngineCaches {
    /// Interaction profiles, rebuilt after a short TTL.
    pub profiles: Cache<Uuid, InteractionProfile>,
    /// Pairwise similarity scores, size-bounded because the pair space grows
    /// quadratically with the user count.
    pub similarity: Cache<PairKey, f64>,
}

impl EngineCaches {
    pub fn new(profile_ttl: Duration, similarity_capacity: u64) -> Self {
        Self {
            profiles: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(profile_ttl)
                .build(),
            similarity: Cache::builder().max_capacity(similarity_capacity).build(),
        }
    }

    /// Drops every cached entry. Exists so tests can assert on cold-cache
    /// behavior deterministically.
    pub fn clear(&self) {
        self.profiles.invalidate_all();
        self.similarity.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
    }

    #[tokio::test]
    async fn test_clear_empties_both_caches() {
        let caches = EngineCaches::new(Duration::from_secs(300), 100);
        let user = Uuid::new_v4();
        caches
            .profiles
            .insert(user, InteractionProfile::new())
            .await;
        caches
            .similarity
            .insert(PairKey::new(user, Uuid::new_v4()), 0.7)
            .await;

        caches.clear();
        // moka applies invalidation lazily; reads must still miss immediately.
        assert!(caches.profiles.get(&user).await.is_none());
    }

    #[tokio::test]
    async fn test_similarity_cache_round_trip() {
        let caches = EngineCaches::new(Duration::from_secs(300), 100);
        let key = PairKey::new(Uuid::new_v4(), Uuid::new_v4());
        caches.similarity.insert(key, 0.42).await;
        assert_eq!(caches.similarity.get(&key).await, Some(0.42));
    }
}
