pub mod cache;
pub mod domains;
pub mod engine;
pub mod profile;
pub mod signals;
pub mod similarity;

pub use engine::{EngineConfig, RecommendationEngine};
