use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::db::store::{CourseStore, GroupStore, MentorStore, PostStore, UserStore};
use crate::error::AppResult;
use crate::models::{
    ConnectionRecord, CourseRecord, GroupRecord, MentorRecord, PostRecord, UserRecord,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed implementation of every repository trait. The engine only
/// ever reads through this adapter.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, display_name, industry, location, region,
                   skills, interests, learning_goals, communities
            FROM users
            WHERE id = $1 AND active = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn active_users(&self, exclude: &[Uuid], cap: i64) -> AppResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, display_name, industry, location, region,
                   skills, interests, learning_goals, communities
            FROM users
            WHERE active = true AND id != ALL($1)
            ORDER BY last_seen_at DESC
            LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn connections_of(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRecord>> {
        let connections = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            SELECT sender_id, receiver_id, accepted_at
            FROM connections
            WHERE status = 'accepted' AND (sender_id = $1 OR receiver_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    async fn mutual_connection_count(&self, a: Uuid, b: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM (
                SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS peer
                FROM connections
                WHERE status = 'accepted' AND (sender_id = $1 OR receiver_id = $1)
                INTERSECT
                SELECT CASE WHEN sender_id = $2 THEN receiver_id ELSE sender_id END AS peer
                FROM connections
                WHERE status = 'accepted' AND (sender_id = $2 OR receiver_id = $2)
            ) mutuals
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl MentorStore for PgStore {
    async fn available_mentors(&self, exclude: &[Uuid], cap: i64) -> AppResult<Vec<MentorRecord>> {
        let mentors = sqlx::query_as::<_, MentorRecord>(
            r#"
            SELECT m.user_id, u.display_name, u.industry, m.expertise,
                   m.rating, m.active_sessions, m.max_sessions, m.last_active_at
            FROM mentors m
            JOIN users u ON u.id = m.user_id
            WHERE m.approved = true AND m.available = true
              AND u.active = true AND m.user_id != ALL($1)
            ORDER BY m.rating DESC
            LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(mentors)
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn member_group_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT group_id FROM group_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn groups_joined_by(&self, user_ids: &[Uuid], cap: i64) -> AppResult<Vec<GroupRecord>> {
        let groups = sqlx::query_as::<_, GroupRecord>(
            r#"
            SELECT DISTINCT g.id, g.name, g.topics, g.communities,
                   g.member_count, g.weekly_activity, g.last_active_at
            FROM groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = ANY($1)
            LIMIT $2
            "#,
        )
        .bind(user_ids)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn groups_matching_topics(
        &self,
        topics: &[String],
        cap: i64,
    ) -> AppResult<Vec<GroupRecord>> {
        let groups = sqlx::query_as::<_, GroupRecord>(
            r#"
            SELECT id, name, topics, communities,
                   member_count, weekly_activity, last_active_at
            FROM groups
            WHERE topics && $1
            ORDER BY member_count DESC
            LIMIT $2
            "#,
        )
        .bind(topics)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn co_members(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT gm.user_id
            FROM group_members gm
            WHERE gm.group_id IN (SELECT group_id FROM group_members WHERE user_id = $1)
              AND gm.user_id != $1
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn cohort_member_count(&self, group_id: Uuid, cohort: &[Uuid]) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM group_members
            WHERE group_id = $1 AND user_id = ANY($2)
            "#,
        )
        .bind(group_id)
        .bind(cohort)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn liked_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT entity_id, MAX(created_at)
            FROM reactions
            WHERE user_id = $1 AND kind = 'like'
            GROUP BY entity_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn commented_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT post_id, MAX(created_at)
            FROM comments
            WHERE user_id = $1
            GROUP BY post_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn shared_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT entity_id, MAX(created_at)
            FROM reactions
            WHERE user_id = $1 AND kind = 'share'
            GROUP BY entity_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_public_posts(
        &self,
        since: DateTime<Utc>,
        exclude_author: Uuid,
        cap: i64,
    ) -> AppResult<Vec<PostRecord>> {
        let posts = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT id, author_id, title, topics,
                   like_count, comment_count, share_count, created_at
            FROM posts
            WHERE visibility = 'public' AND created_at >= $1 AND author_id != $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(exclude_author)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn co_likers(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT r.user_id
            FROM reactions r
            WHERE r.kind = 'like'
              AND r.entity_id IN (
                  SELECT entity_id FROM reactions
                  WHERE user_id = $1 AND kind = 'like'
              )
              AND r.user_id != $1
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn cohort_like_count(&self, post_id: Uuid, cohort: &[Uuid]) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT user_id)
            FROM reactions
            WHERE entity_id = $1 AND kind = 'like' AND user_id = ANY($2)
            "#,
        )
        .bind(post_id)
        .bind(cohort)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn published_courses(
        &self,
        exclude: &[Uuid],
        cap: i64,
    ) -> AppResult<Vec<CourseRecord>> {
        let courses = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT id, title, skills, topics, enrollment_count, published_at
            FROM courses
            WHERE published = true AND id != ALL($1)
            ORDER BY enrollment_count DESC
            LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(cap)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn enrolled_course_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM enrollments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn cohort_enrollment_count(
        &self,
        course_id: Uuid,
        cohort: &[Uuid],
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM enrollments
            WHERE course_id = $1 AND user_id = ANY($2)
            "#,
        )
        .bind(course_id)
        .bind(cohort)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
