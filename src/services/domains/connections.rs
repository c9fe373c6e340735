use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Domain, RecommendationOptions, ScoredRecommendation, UserRecord};
use crate::services::engine::RecommendationEngine;
use crate::services::signals::{confidence, name_overlap, round2};

const CANDIDATE_CAP: i64 = 200;

const SIMILARITY_WEIGHT: f64 = 0.40;
const SKILLS_WEIGHT: f64 = 0.25;
const INDUSTRY_BOOST: f64 = 0.15;
const LOCATION_BOOST: f64 = 0.10;
const REGION_BOOST: f64 = 0.05;
/// Each mutual connection adds this much, capped below.
const MUTUAL_STEP: f64 = 0.02;
const MUTUAL_CAP: f64 = 0.10;

const SKILLS_REASON_THRESHOLD: f64 = 0.2;
const SIMILARITY_REASON_THRESHOLD: f64 = 0.1;

/// Recommends new connections: active users the subject is not yet connected
/// to, scored on behavior similarity, skill overlap, categorical matches, and
/// mutual connections.
pub(crate) async fn recommend(
    engine: &RecommendationEngine,
    subject: &UserRecord,
    options: &RecommendationOptions,
) -> Vec<ScoredRecommendation> {
    let connected: HashSet<Uuid> = match engine.users.connections_of(subject.id).await {
        Ok(connections) => connections
            .iter()
            .map(|c| c.other_side(subject.id))
            .collect(),
        Err(e) => {
            // Without the existing-connection set we cannot honor exclusion,
            // so degrade to an empty list.
            tracing::warn!(subject = %subject.id, error = %e, "Connection lookup failed");
            return Vec::new();
        }
    };

    let mut exclude: Vec<Uuid> = vec![subject.id];
    exclude.extend(&connected);
    exclude.extend(&options.exclude_ids);

    let candidates = match engine.users.active_users(&exclude, CANDIDATE_CAP).await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(subject = %subject.id, error = %e, "Candidate query failed");
            return Vec::new();
        }
    };

    let excluded: HashSet<Uuid> = exclude.into_iter().collect();
    let candidates: Vec<UserRecord> = candidates
        .into_iter()
        .filter(|c| !excluded.contains(&c.id))
        .collect();

    stream::iter(candidates.into_iter())
        .map(|candidate| async move {
            let similarity = engine.similarity.similarity(subject.id, candidate.id).await;
            let mutual_connections = match engine
                .users
                .mutual_connection_count(subject.id, candidate.id)
                .await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(
                        subject = %subject.id,
                        candidate = %candidate.id,
                        error = %e,
                        "Mutual connection count unavailable"
                    );
                    0
                }
            };
            score_candidate(subject, &candidate, similarity, mutual_connections, options)
        })
        .buffered(engine.config.worker_concurrency)
        .collect()
        .await
}

/// Blends the connection signals into one rounded composite score.
pub(crate) fn score_candidate(
    subject: &UserRecord,
    candidate: &UserRecord,
    similarity: f64,
    mutual_connections: i64,
    options: &RecommendationOptions,
) -> ScoredRecommendation {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    score += SIMILARITY_WEIGHT * similarity * options.boost_for("similarity");
    if similarity > SIMILARITY_REASON_THRESHOLD {
        reasons.push("Engages with the same content as you".to_string());
    }

    let skill_overlap = name_overlap(&subject.skills, &candidate.skills);
    score += SKILLS_WEIGHT * skill_overlap * options.boost_for("skills");
    if skill_overlap > SKILLS_REASON_THRESHOLD {
        reasons.push("Similar skills".to_string());
    }

    if same_text(&subject.industry, &candidate.industry) {
        score += INDUSTRY_BOOST * options.boost_for("industry");
        reasons.push("Works in your industry".to_string());
    }

    // Exact location wins; region only applies when the city differs.
    if same_text(&subject.location, &candidate.location) {
        score += LOCATION_BOOST * options.boost_for("location");
        reasons.push("Based in your city".to_string());
    } else if same_text(&subject.region, &candidate.region) {
        score += REGION_BOOST * options.boost_for("location");
        reasons.push("From your region".to_string());
    }

    let mutual_boost = (mutual_connections as f64 * MUTUAL_STEP).min(MUTUAL_CAP);
    score += mutual_boost * options.boost_for("mutual_connections");
    if mutual_connections > 0 {
        reasons.push(format!("{} mutual connections", mutual_connections));
    }

    // Opt-in counterweight to pure overlap maximization.
    if options.diversity_weight > 0.0 {
        score += (1.0 - skill_overlap) * options.diversity_weight * 0.1;
    }

    let score = round2(score);
    ScoredRecommendation {
        entity_id: candidate.id,
        domain: Domain::Connection,
        display_name: candidate.display_name.clone(),
        score,
        confidence: confidence(reasons.len(), similarity),
        reasons,
    }
}

fn same_text(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
