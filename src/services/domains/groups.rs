use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Domain, GroupRecord, RecommendationOptions, ScoredRecommendation, UserRecord};
use crate::services::domains::SIMILAR_COHORT_SIZE;
use crate::services::engine::RecommendationEngine;
use crate::services::signals::{confidence, name_overlap, recency, round2};

const CANDIDATE_CAP: i64 = 200;

const MEMBER_FRACTION_WEIGHT: f64 = 0.35;
const TOPICS_WEIGHT: f64 = 0.25;
const AFFINITY_BOOST: f64 = 0.15;
const SIZE_BONUS: f64 = 0.10;
const ACTIVITY_BONUS: f64 = 0.10;
const RECENCY_WEIGHT: f64 = 0.05;

/// Groups inside this member range count as active communities; smaller ones
/// are too quiet, larger ones too anonymous.
const ACTIVE_COMMUNITY_MIN: i64 = 10;
const ACTIVE_COMMUNITY_MAX: i64 = 500;
const WEEKLY_ACTIVITY_THRESHOLD: i64 = 20;
const RECENCY_HALF_LIFE_DAYS: f64 = 14.0;
const TOPICS_REASON_THRESHOLD: f64 = 0.2;

/// Recommends groups: the union of groups the subject's similar users belong
/// to and groups matching the subject's interests, minus anything already
/// joined.
pub(crate) async fn recommend(
    engine: &RecommendationEngine,
    subject: &UserRecord,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let joined: HashSet<Uuid> = match engine.groups.member_group_ids(subject.id).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Membership lookup failed");
            return Vec::new();
        }
    };

    let cohort: Vec<Uuid> = engine
        .similarity
        .similar_users(subject.id, SIMILAR_COHORT_SIZE)
        .await
        .into_iter()
        .map(|(id, _)| id)
        .collect();

    let mut candidates: Vec<GroupRecord> = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::new();

    if !cohort.is_empty() {
        match engine.groups.groups_joined_by(&cohort, CANDIDATE_CAP).await {
            Ok(groups) => {
                for group in groups {
                    if seen.insert(group.id) {
                        candidates.push(group);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(subject = %subject.id, error = %e, "Cohort group pool unavailable");
            }
        }
    }

    if !subject.interests.is_empty() {
        match engine
            .groups
            .groups_matching_topics(&subject.interests, CANDIDATE_CAP)
            .await
        {
            Ok(groups) => {
                for group in groups {
                    if seen.insert(group.id) {
                        candidates.push(group);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(subject = %subject.id, error = %e, "Topic group pool unavailable");
            }
        }
    }

    candidates.retain(|g| !joined.contains(&g.id) && !options.exclude_ids.contains(&g.id));
    candidates.truncate(CANDIDATE_CAP as usize);

    let cohort_size = cohort.len();
    let cohort = &cohort;
    stream::iter(candidates.into_iter())
        .map(|group| async move {
            let member_fraction = if cohort_size == 0 {
                0.0
            } else {
                match engine.groups.cohort_member_count(group.id, cohort).await {
                    Ok(count) => (count as f64 / cohort_size as f64).clamp(0.0, 1.0),
                    Err(e) => {
                        tracing::warn!(
                            subject = %subject.id,
                            group = %group.id,
                            error = %e,
                            "Cohort membership count unavailable"
                        );
                        0.0
                    }
                }
            };
            score_candidate(subject, &group, member_fraction, options)
        })
        .buffered(engine.config.worker_concurrency)
        .collect()
        .await
}

pub(crate) fn score_candidate(
    subject: &UserRecord,
    group: &GroupRecord,
    member_fraction: f64,
    options: &RecommendationOptions,
) -> ScoredRecommendation {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    score += MEMBER_FRACTION_WEIGHT * member_fraction * options.boost_for("similarity");
    if member_fraction > 0.1 {
        reasons.push("People like you are members".to_string());
    }

    let topic_overlap = name_overlap(&group.topics, &subject.interests);
    score += TOPICS_WEIGHT * topic_overlap * options.boost_for("topics");
    if topic_overlap > TOPICS_REASON_THRESHOLD {
        reasons.push("Covers your interests".to_string());
    }

    let shared_community = group.communities.iter().any(|c| {
        subject
            .communities
            .iter()
            .any(|s| s.eq_ignore_ascii_case(c))
    });
    if shared_community {
        score += AFFINITY_BOOST * options.boost_for("community");
        reasons.push("Part of a community you identify with".to_string());
    }

    if (ACTIVE_COMMUNITY_MIN..=ACTIVE_COMMUNITY_MAX).contains(&group.member_count) {
        score += SIZE_BONUS;
        reasons.push("Active community".to_string());
    }

    if group.weekly_activity >= WEEKLY_ACTIVITY_THRESHOLD {
        score += ACTIVITY_BONUS;
        reasons.push("Busy discussions this week".to_string());
    }

    score += RECENCY_WEIGHT * recency(group.last_active_at, Utc::now(), RECENCY_HALF_LIFE_DAYS);

    let score = round2(score);
    ScoredRecommendation {
        entity_id: group.id,
        domain: Domain::Group,
        display_name: group.name.clone(),
        score,
        confidence: confidence(reasons.len(), member_fraction),
        reasons,
    }
}
