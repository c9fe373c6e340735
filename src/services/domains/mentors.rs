use chrono::Utc;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::models::{Domain, MentorRecord, RecommendationOptions, ScoredRecommendation, UserRecord};
use crate::services::engine::RecommendationEngine;
use crate::services::signals::{confidence, name_overlap, recency, round2};

const CANDIDATE_CAP: i64 = 100;

const SIMILARITY_WEIGHT: f64 = 0.30;
const GOALS_WEIGHT: f64 = 0.30;
const INDUSTRY_BOOST: f64 = 0.15;
const RATING_WEIGHT: f64 = 0.15;
const ACTIVITY_WEIGHT: f64 = 0.10;

const ACTIVITY_HALF_LIFE_DAYS: f64 = 14.0;
const GOALS_REASON_THRESHOLD: f64 = 0.2;
/// Used when the subject has no stated learning goals: neither a match nor a
/// mismatch, so the goal signal sits in the middle.
const NEUTRAL_GOAL_SCORE: f64 = 0.5;
const STRONG_RATING: f64 = 4.5;

/// Recommends mentors: approved and available, below session capacity,
/// scored on behavior similarity, expertise-vs-goals fit, industry, rating,
/// and recent activity.
pub(crate) async fn recommend(
    engine: &RecommendationEngine,
    subject: &UserRecord,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let mut exclude: Vec<Uuid> = vec![subject.id];
    exclude.extend(&options.exclude_ids);

    let mentors = match engine.mentors.available_mentors(&exclude, CANDIDATE_CAP).await {
        Ok(mentors) => mentors,
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Mentor query failed");
            return Vec::new();
        }
    };

    let max_sessions = engine.config.max_mentor_sessions;
    let candidates: Vec<MentorRecord> = mentors
        .into_iter()
        .filter(|m| m.user_id != subject.id && !options.exclude_ids.contains(&m.user_id))
        .filter(|m| m.active_sessions < max_sessions.min(m.max_sessions))
        .collect();

    stream::iter(candidates.into_iter())
        .map(|mentor| async move {
            let similarity = engine.similarity.similarity(subject.id, mentor.user_id).await;
            score_candidate(subject, &mentor, similarity, options)
        })
        .buffered(engine.config.worker_concurrency)
        .collect()
        .await
}

pub(crate) fn score_candidate(
    subject: &UserRecord,
    mentor: &MentorRecord,
    similarity: f64,
    options: &RecommendationOptions,
) -> ScoredRecommendation {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    score += SIMILARITY_WEIGHT * similarity * options.boost_for("similarity");
    if similarity > 0.1 {
        reasons.push("Active in the circles you follow".to_string());
    }

    let goal_fit = if subject.learning_goals.is_empty() {
        NEUTRAL_GOAL_SCORE
    } else {
        name_overlap(&subject.learning_goals, &mentor.expertise)
    };
    score += GOALS_WEIGHT * goal_fit * options.boost_for("goals");
    if !subject.learning_goals.is_empty() && goal_fit > GOALS_REASON_THRESHOLD {
        reasons.push("Teaches what you want to learn".to_string());
    }

    let same_industry = match (&subject.industry, &mentor.industry) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    if same_industry {
        score += INDUSTRY_BOOST * options.boost_for("industry");
        reasons.push("Mentors in your industry".to_string());
    }

    let rating_signal = (mentor.rating / 5.0).clamp(0.0, 1.0);
    score += RATING_WEIGHT * rating_signal * options.boost_for("rating");
    if mentor.rating >= STRONG_RATING {
        reasons.push("Highly rated by mentees".to_string());
    }

    let activity = recency(mentor.last_active_at, Utc::now(), ACTIVITY_HALF_LIFE_DAYS);
    score += ACTIVITY_WEIGHT * activity;
    if activity > 0.5 {
        reasons.push("Recently active".to_string());
    }

    let score = round2(score);
    ScoredRecommendation {
        entity_id: mentor.user_id,
        domain: Domain::Mentor,
        display_name: mentor.display_name.clone(),
        score,
        confidence: confidence(reasons.len(), similarity),
        reasons,
    }
}
