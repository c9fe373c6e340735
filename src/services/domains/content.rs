use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::models::{Domain, PostRecord, RecommendationOptions, ScoredRecommendation, UserRecord};
use crate::services::domains::SIMILAR_COHORT_SIZE;
use crate::services::engine::RecommendationEngine;
use crate::services::signals::{confidence, name_overlap, recency, round2};

const CANDIDATE_CAP: i64 = 300;
const RECENT_WINDOW_DAYS: i64 = 7;

const FRESHNESS_WEIGHT: f64 = 0.35;
const COHORT_WEIGHT: f64 = 0.30;
const TOPICS_WEIGHT: f64 = 0.20;
const ENGAGEMENT_BONUS: f64 = 0.15;

/// Content loses half its freshness weight every three days.
const FRESHNESS_HALF_LIFE_DAYS: f64 = 3.0;
const ENGAGEMENT_THRESHOLD: i64 = 50;
const TOPICS_REASON_THRESHOLD: f64 = 0.2;
const COHORT_REASON_THRESHOLD: f64 = 0.2;

/// Recommends content: recent public posts by others that the subject has not
/// already engaged with, scored on freshness, similar-cohort reactions, topic
/// fit, and overall engagement.
pub(crate) async fn recommend(
    engine: &RecommendationEngine,
    subject: &UserRecord,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let profile = engine.profiles.build(subject.id).await;

    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let posts = match engine
        .posts
        .recent_public_posts(since, subject.id, CANDIDATE_CAP)
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Recent post query failed");
            return Vec::new();
        }
    };

    let candidates: Vec<PostRecord> = posts
        .into_iter()
        .filter(|p| p.author_id != subject.id)
        .filter(|p| !profile.likes.contains(&p.id) && !profile.comments.contains(&p.id))
        .filter(|p| !options.exclude_ids.contains(&p.id))
        .collect();

    let cohort: Vec<Uuid> = engine
        .similarity
        .similar_users(subject.id, SIMILAR_COHORT_SIZE)
        .await
        .into_iter()
        .map(|(id, _)| id)
        .collect();

    let cohort_size = cohort.len();
    let cohort = &cohort;
    stream::iter(candidates.into_iter())
        .map(|post| async move {
            let cohort_fraction = if cohort_size == 0 {
                0.0
            } else {
                match engine.posts.cohort_like_count(post.id, cohort).await {
                    Ok(count) => (count as f64 / cohort_size as f64).clamp(0.0, 1.0),
                    Err(e) => {
                        tracing::warn!(
                            subject = %subject.id,
                            post = %post.id,
                            error = %e,
                            "Cohort like count unavailable"
                        );
                        0.0
                    }
                }
            };
            score_candidate(subject, &post, cohort_fraction, options)
        })
        .buffered(engine.config.worker_concurrency)
        .collect()
        .await
}

pub(crate) fn score_candidate(
    subject: &UserRecord,
    post: &PostRecord,
    cohort_fraction: f64,
    options: &RecommendationOptions,
) -> ScoredRecommendation {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Freshness is the dominant driver for content and feeds confidence.
    let freshness = recency(post.created_at, Utc::now(), FRESHNESS_HALF_LIFE_DAYS);
    score += FRESHNESS_WEIGHT * freshness * options.boost_for("freshness");
    if freshness > 0.5 {
        reasons.push("Posted in the last few days".to_string());
    }

    score += COHORT_WEIGHT * cohort_fraction * options.boost_for("similarity");
    if cohort_fraction > COHORT_REASON_THRESHOLD {
        reasons.push("Liked by people with your interests".to_string());
    }

    let topic_overlap = name_overlap(&post.topics, &subject.interests);
    score += TOPICS_WEIGHT * topic_overlap * options.boost_for("topics");
    if topic_overlap > TOPICS_REASON_THRESHOLD {
        reasons.push("Matches your interests".to_string());
    }

    if post.total_engagement() >= ENGAGEMENT_THRESHOLD {
        score += ENGAGEMENT_BONUS;
        reasons.push("Getting a lot of engagement".to_string());
    }

    let score = round2(score);
    ScoredRecommendation {
        entity_id: post.id,
        domain: Domain::Content,
        display_name: post.title.clone(),
        score,
        confidence: confidence(reasons.len(), freshness),
        reasons,
    }
}
