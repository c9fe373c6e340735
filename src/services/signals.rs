//! Shared scoring primitives: set similarity, time decay, rounding, and the
//! confidence estimate derived from reason evidence.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard similarity |A∩B| / |A∪B|.
///
/// Two empty sets score 0, not 1, so users with no data do not look identical
/// to each other.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Jaccard over two name lists, compared case-insensitively.
pub fn name_overlap(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<String> = a.iter().map(|s| s.to_lowercase()).collect();
    let b: HashSet<String> = b.iter().map(|s| s.to_lowercase()).collect();
    jaccard(&a, &b)
}

/// Exponential half-life decay: 1.0 at age zero, 0.5 at one half-life.
pub fn decay(age_days: f64, half_life_days: f64) -> f64 {
    0.5_f64.powf(age_days / half_life_days)
}

/// Decay applied to the age of an event relative to now.
pub fn recency(event: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let age_days = (now - event).num_seconds().max(0) as f64 / 86_400.0;
    decay(age_days, half_life_days)
}

/// Rounds to 2 decimal places. Scores and confidence values are compared and
/// returned at this precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Secondary evidence indicator: half from how many reasons contributed
/// (saturating at 5) and half from the strength of the primary signal.
pub fn confidence(reason_count: usize, primary_signal: f64) -> f64 {
    let evidence = (reason_count as f64 / 5.0).min(1.0) * 0.5;
    let strength = primary_signal.clamp(0.0, 1.0) * 0.5;
    round2(evidence + strength)
}
