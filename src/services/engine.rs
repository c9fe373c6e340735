use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::Config;
use crate::db::{CourseStore, GroupStore, MentorStore, PostStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{
    Domain, RecommendationOptions, RecommendationRequest, ScoredRecommendation, UserRecord,
};
use crate::services::cache::EngineCaches;
use crate::services::domains;
use crate::services::profile::ProfileBuilder;
use crate::services::similarity::SimilarityEngine;

/// Engine tunables, derived from application config.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrent store lookups during candidate enrichment.
    pub worker_concurrency: usize,
    /// Overall deadline for a single recommendation request.
    pub request_deadline: Duration,
    pub profile_ttl: Duration,
    pub similarity_cache_capacity: u64,
    /// Mentors at or above this many active sessions are at capacity.
    pub max_mentor_sessions: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: 8,
            request_deadline: Duration::from_secs(5),
            profile_ttl: Duration::from_secs(300),
            similarity_cache_capacity: 10_000,
            max_mentor_sessions: 5,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            worker_concurrency: config.worker_concurrency,
            request_deadline: Duration::from_secs(config.request_deadline_secs),
            profile_ttl: Duration::from_secs(config.profile_ttl_secs),
            similarity_cache_capacity: config.similarity_cache_capacity,
            ..Default::default()
        }
    }
}

/// Orchestrates one recommendation request: candidate generation,
/// multi-signal scoring, confidence, ranking, and pagination. Holds the
/// injected repository handles and owns the derived-data caches; a request
/// never writes platform state.
pub struct RecommendationEngine {
    pub(crate) users: Arc<dyn UserStore>,
    pub(crate) mentors: Arc<dyn MentorStore>,
    pub(crate) groups: Arc<dyn GroupStore>,
    pub(crate) posts: Arc<dyn PostStore>,
    pub(crate) courses: Arc<dyn CourseStore>,
    pub(crate) profiles: Arc<ProfileBuilder>,
    pub(crate) similarity: SimilarityEngine,
    pub(crate) config: EngineConfig,
    caches: EngineCaches,
}

impl RecommendationEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        mentors: Arc<dyn MentorStore>,
        groups: Arc<dyn GroupStore>,
        posts: Arc<dyn PostStore>,
        courses: Arc<dyn CourseStore>,
        config: EngineConfig,
    ) -> Self {
        // buffered(0) never yields; a zero from the environment would stall
        // every request until the deadline.
        let config = EngineConfig {
            worker_concurrency: config.worker_concurrency.max(1),
            ..config
        };
        let caches = EngineCaches::new(config.profile_ttl, config.similarity_cache_capacity);
        let profiles = Arc::new(ProfileBuilder::new(
            users.clone(),
            groups.clone(),
            posts.clone(),
            caches.clone(),
        ));
        let similarity = SimilarityEngine::new(
            profiles.clone(),
            groups.clone(),
            posts.clone(),
            caches.clone(),
            config.worker_concurrency,
        );

        Self {
            users,
            mentors,
            groups,
            posts,
            courses,
            profiles,
            similarity,
            config,
            caches,
        }
    }

    /// Serves a recommendation request end to end.
    ///
    /// Returns `NotFound` for an unknown subject and `InvalidInput` for
    /// malformed options. Transient trouble inside the pipeline degrades to a
    /// shorter or empty list, never an error; deadline expiry degrades to an
    /// empty list with a warning.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<Vec<ScoredRecommendation>> {
        request.options.validate()?;

        let subject = self
            .users
            .user_by_id(request.subject_user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("user {} not found", request.subject_user_id))
            })?;

        let outcome = tokio::time::timeout(
            self.config.request_deadline,
            self.dispatch(request.domain, &subject, &request.options),
        )
        .await;

        match outcome {
            Ok(scored) => Ok(rank(scored, request.domain, &request.options)),
            Err(_) => {
                tracing::warn!(
                    subject = %subject.id,
                    domain = ?request.domain,
                    deadline_ms = self.config.request_deadline.as_millis() as u64,
                    "Recommendation request hit its deadline, returning empty list"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn dispatch(
        &self,
        domain: Domain,
        subject: &UserRecord,
        options: &RecommendationOptions,
    ) -> Vec<ScoredRecommendation> {
        let scored = match domain {
            Domain::Connection => domains::connections::recommend(self, subject, options).await,
            Domain::Mentor => domains::mentors::recommend(self, subject, options).await,
            Domain::Group => domains::groups::recommend(self, subject, options).await,
            Domain::Content => domains::content::recommend(self, subject, options).await,
            Domain::Course => domains::courses::recommend(self, subject, options).await,
        };

        tracing::info!(
            subject = %subject.id,
            domain = ?domain,
            scored = scored.len(),
            "Scored recommendation candidates"
        );

        scored
    }

    /// Pairwise behavior similarity between two users, in [0, 1].
    pub async fn user_similarity(&self, a: Uuid, b: Uuid) -> f64 {
        self.similarity.similarity(a, b).await
    }

    /// Drops all cached profiles and similarity scores. Test support: lets
    /// suites assert on cold-cache behavior deterministically.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }
}

/// Filters by the domain's score floor, sorts by score descending (stable
/// with respect to generation order for ties), and applies offset/limit.
/// Pagination always happens after full in-memory scoring.
pub(crate) fn rank(
    mut scored: Vec<ScoredRecommendation>,
    domain: Domain,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let min_score = options.min_score_for(domain);
    scored.retain(|r| r.score >= min_score);
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
    });
    scored
        .into_iter()
        .skip(options.offset)
        .take(options.limit)
        .collect()
}
