use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{CourseRecord, Domain, RecommendationOptions, ScoredRecommendation, UserRecord};
use crate::services::domains::SIMILAR_COHORT_SIZE;
use crate::services::engine::RecommendationEngine;
use crate::services::signals::{confidence, name_overlap, recency, round2};

const CANDIDATE_CAP: i64 = 200;

const SKILL_GAP_WEIGHT: f64 = 0.35;
const COHORT_WEIGHT: f64 = 0.25;
const TOPICS_WEIGHT: f64 = 0.20;
const POPULARITY_BONUS: f64 = 0.10;
const FRESHNESS_WEIGHT: f64 = 0.10;

const POPULARITY_THRESHOLD: i64 = 100;
const FRESHNESS_HALF_LIFE_DAYS: f64 = 30.0;
const GAP_REASON_THRESHOLD: f64 = 0.2;
const NEUTRAL_GAP_SCORE: f64 = 0.5;

/// Recommends courses the subject is not enrolled in, scored on how well the
/// course teaches skills the subject wants but does not yet have, what
/// similar users enrolled in, topic fit, popularity, and freshness.
pub(crate) async fn recommend(
    engine: &RecommendationEngine,
    subject: &UserRecord,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let enrolled: Vec<Uuid> = match engine.courses.enrolled_course_ids(subject.id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Enrollment lookup failed");
            return Vec::new();
        }
    };

    let mut exclude = enrolled;
    exclude.extend(&options.exclude_ids);

    let courses = match engine.courses.published_courses(&exclude, CANDIDATE_CAP).await {
        Ok(courses) => courses,
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Course query failed");
            return Vec::new();
        }
    };

    let excluded: HashSet<Uuid> = exclude.into_iter().collect();
    let candidates: Vec<CourseRecord> = courses
        .into_iter()
        .filter(|c| !excluded.contains(&c.id))
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
        .map(|course| async move {
            let cohort_fraction = if cohort_size == 0 {
                0.0
            } else {
                match engine
                    .courses
                    .cohort_enrollment_count(course.id, cohort)
                    .await
                {
                    Ok(count) => (count as f64 / cohort_size as f64).clamp(0.0, 1.0),
                    Err(e) => {
                        tracing::warn!(
                            subject = %subject.id,
                            course = %course.id,
                            error = %e,
                            "Cohort enrollment count unavailable"
                        );
                        0.0
                    }
                }
            };
            score_candidate(subject, &course, cohort_fraction, options)
        })
        .buffered(engine.config.worker_concurrency)
        .collect()
        .await
}

pub(crate) fn score_candidate(
    subject: &UserRecord,
    course: &CourseRecord,
    cohort_fraction: f64,
    options: &RecommendationOptions,
) -> ScoredRecommendation {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Only skills the subject does not already have count toward the gap.
    let have: HashSet<String> = subject.skills.iter().map(|s| s.to_lowercase()).collect();
    let gap: Vec<String> = course
        .skills
        .iter()
        .filter(|s| !have.contains(&s.to_lowercase()))
        .cloned()
        .collect();

    let gap_fit = if subject.learning_goals.is_empty() {
        NEUTRAL_GAP_SCORE
    } else {
        name_overlap(&gap, &subject.learning_goals)
    };
    score += SKILL_GAP_WEIGHT * gap_fit * options.boost_for("goals");
    if !subject.learning_goals.is_empty() && gap_fit > GAP_REASON_THRESHOLD {
        reasons.push("Teaches skills you want to pick up".to_string());
    }

    score += COHORT_WEIGHT * cohort_fraction * options.boost_for("similarity");
    if cohort_fraction > 0.2 {
        reasons.push("People like you took this course".to_string());
    }

    let topic_overlap = name_overlap(&course.topics, &subject.interests);
    score += TOPICS_WEIGHT * topic_overlap * options.boost_for("topics");
    if topic_overlap > 0.2 {
        reasons.push("Covers your interests".to_string());
    }

    if course.enrollment_count >= POPULARITY_THRESHOLD {
        score += POPULARITY_BONUS;
        reasons.push("Popular on the platform".to_string());
    }

    score += FRESHNESS_WEIGHT * recency(course.published_at, Utc::now(), FRESHNESS_HALF_LIFE_DAYS);

    let score = round2(score);
    ScoredRecommendation {
        entity_id: course.id,
        domain: Domain::Course,
        display_name: course.title.clone(),
        score,
        confidence: confidence(reasons.len(), cohort_fraction),
        reasons,
    }
}
