//! Per-domain candidate generation and multi-signal scoring. Every domain
//! follows the same shape: gather a bounded candidate pool excluding the
//! subject and anything already related, enrich each candidate with bounded
//! concurrency, then blend weighted signals into one rounded composite score
//! with human-readable reasons.

pub mod connections;
pub mod content;
pub mod courses;
pub mod groups;
pub mod mentors;

/// Cohort size used when a domain scores candidates against the subject's
/// most similar users.
pub(crate) const SIMILAR_COHORT_SIZE: usize = 50;
