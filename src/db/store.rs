use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ConnectionRecord, CourseRecord, GroupRecord, MentorRecord, PostRecord, UserRecord,
};

/// Read access to user profiles and the connection graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>>;

    /// Active users excluding the given ids, capped.
    async fn active_users(&self, exclude: &[Uuid], cap: i64) -> AppResult<Vec<UserRecord>>;

    /// Accepted connections where the user is on either side.
    async fn connections_of(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRecord>>;

    async fn mutual_connection_count(&self, a: Uuid, b: Uuid) -> AppResult<i64>;
}

/// Read access to the mentor directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MentorStore: Send + Sync {
    /// Approved, available mentors excluding the given ids, capped.
    async fn available_mentors(&self, exclude: &[Uuid], cap: i64) -> AppResult<Vec<MentorRecord>>;
}

/// Read access to groups and memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn member_group_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Groups any of the given users belong to, capped.
    async fn groups_joined_by(&self, user_ids: &[Uuid], cap: i64) -> AppResult<Vec<GroupRecord>>;

    /// Groups whose topics intersect the given tags, capped.
    async fn groups_matching_topics(
        &self,
        topics: &[String],
        cap: i64,
    ) -> AppResult<Vec<GroupRecord>>;

    /// Other members of the groups the user belongs to, capped.
    async fn co_members(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>>;

    /// How many of the cohort belong to the group.
    async fn cohort_member_count(&self, group_id: Uuid, cohort: &[Uuid]) -> AppResult<i64>;
}

/// Read access to content posts and reaction records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn liked_entity_ids(&self, user_id: Uuid)
        -> AppResult<Vec<(Uuid, DateTime<Utc>)>>;

    async fn commented_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>>;

    async fn shared_entity_ids(&self, user_id: Uuid)
        -> AppResult<Vec<(Uuid, DateTime<Utc>)>>;

    /// Publicly visible posts created since the given instant, excluding the
    /// given author, capped.
    async fn recent_public_posts(
        &self,
        since: DateTime<Utc>,
        exclude_author: Uuid,
        cap: i64,
    ) -> AppResult<Vec<PostRecord>>;

    /// Other users who liked any post the user liked, capped.
    async fn co_likers(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>>;

    /// How many of the cohort liked the post.
    async fn cohort_like_count(&self, post_id: Uuid, cohort: &[Uuid]) -> AppResult<i64>;
}

/// Read access to the course catalog and enrollments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Published courses excluding the given ids, capped.
    async fn published_courses(&self, exclude: &[Uuid], cap: i64)
        -> AppResult<Vec<CourseRecord>>;

    async fn enrolled_course_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// How many of the cohort are enrolled in the course.
    async fn cohort_enrollment_count(&self, course_id: Uuid, cohort: &[Uuid])
        -> AppResult<i64>;
}
