use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const MAX_LIMIT: usize = 100;
const MAX_OFFSET: usize = 10_000;

/// Recommendation domains served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Connection,
    Mentor,
    Group,
    Content,
    Course,
}

impl Domain {
    /// Default minimum composite score a candidate must reach to be returned.
    pub fn default_min_score(&self) -> f64 {
        match self {
            Domain::Connection | Domain::Mentor => 0.3,
            Domain::Group | Domain::Course => 0.2,
            Domain::Content => 0.1,
        }
    }
}

/// Caller-tunable knobs for a single recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationOptions {
    pub limit: usize,
    pub offset: usize,
    /// Minimum rounded composite score; falls back to the domain default.
    pub min_score: Option<f64>,
    /// When > 0, connection ranking trades some overlap for variety.
    pub diversity_weight: f64,
    pub exclude_ids: Vec<Uuid>,
    /// Per-signal multipliers, clamped to [0.5, 2.0] before use.
    pub boost_factors: HashMap<String, f64>,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            min_score: None,
            diversity_weight: 0.0,
            exclude_ids: Vec::new(),
            boost_factors: HashMap::new(),
        }
    }
}

impl RecommendationOptions {
    /// Rejects option combinations the engine cannot serve meaningfully.
    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if self.offset > MAX_OFFSET {
            return Err(AppError::InvalidInput(format!(
                "offset must not exceed {}",
                MAX_OFFSET
            )));
        }
        if let Some(min_score) = self.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                return Err(AppError::InvalidInput(
                    "min_score must be within [0, 1]".to_string(),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.diversity_weight) {
            return Err(AppError::InvalidInput(
                "diversity_weight must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective score floor for the given domain.
    pub fn min_score_for(&self, domain: Domain) -> f64 {
        self.min_score.unwrap_or_else(|| domain.default_min_score())
    }

    /// Multiplier for a named signal, clamped so a caller cannot zero out or
    /// explode a weight.
    pub fn boost_for(&self, signal: &str) -> f64 {
        self.boost_factors
            .get(signal)
            .copied()
            .map(|factor| factor.clamp(0.5, 2.0))
            .unwrap_or(1.0)
    }
}

/// A single recommendation request, as received over the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub subject_user_id: Uuid,
    pub domain: Domain,
    #[serde(default)]
    pub options: RecommendationOptions,
}

/// One ranked, explainable recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub entity_id: Uuid,
    pub domain: Domain,
    pub display_name: String,
    /// Composite score, rounded to 2 decimals.
    pub score: f64,
    /// Human-readable contributing reasons, in signal order.
    pub reasons: Vec<String>,
    /// Secondary evidence indicator in [0, 1], rounded to 2 decimals.
    pub confidence: f64,
}
