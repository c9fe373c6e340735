pub mod profile;
pub mod records;
pub mod recommendation;

pub use profile::InteractionProfile;
pub use records::{
    ConnectionRecord, CourseRecord, GroupRecord, MentorRecord, PostRecord, UserRecord,
};
pub use recommendation::{
    Domain, RecommendationOptions, RecommendationRequest, ScoredRecommendation,
};
