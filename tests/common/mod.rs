//! In-memory store fakes shared by the integration tests. Data lives behind a
//! mutex so tests can mutate the "database" after the engine is built.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use elevate_api::db::{CourseStore, GroupStore, MentorStore, PostStore, UserStore};
use elevate_api::error::{AppError, AppResult};
use elevate_api::models::{
    ConnectionRecord, CourseRecord, GroupRecord, MentorRecord, PostRecord, UserRecord,
};
use elevate_api::services::{EngineConfig, RecommendationEngine};

#[derive(Default)]
pub struct FakeData {
    pub users: Vec<UserRecord>,
    pub connections: Vec<ConnectionRecord>,
    /// Symmetric mutual-connection counts keyed by user pair.
    pub mutuals: Vec<(Uuid, Uuid, i64)>,
    pub mentors: Vec<MentorRecord>,
    pub groups: Vec<GroupRecord>,
    /// (group_id, user_id)
    pub memberships: Vec<(Uuid, Uuid)>,
    pub posts: Vec<PostRecord>,
    /// (user_id, entity_id, at)
    pub likes: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    pub comments: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    pub shares: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    pub courses: Vec<CourseRecord>,
    /// (course_id, user_id)
    pub enrollments: Vec<(Uuid, Uuid)>,
    /// When set, post queries fail to exercise degraded paths.
    pub fail_posts: bool,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    pub data: Arc<Mutex<FakeData>>,
}

impl FakeStore {
    pub fn new(data: FakeData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }
}

#[async_trait]
impl UserStore for FakeStore {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn active_users(&self, exclude: &[Uuid], cap: i64) -> AppResult<Vec<UserRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .filter(|u| !exclude.contains(&u.id))
            .take(cap as usize)
            .cloned()
            .collect())
    }

    async fn connections_of(&self, user_id: Uuid) -> AppResult<Vec<ConnectionRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .connections
            .iter()
            .filter(|c| c.sender_id == user_id || c.receiver_id == user_id)
            .cloned()
            .collect())
    }

    async fn mutual_connection_count(&self, a: Uuid, b: Uuid) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data
            .mutuals
            .iter()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(_, _, count)| *count)
            .unwrap_or(0))
    }
}

#[async_trait]
impl MentorStore for FakeStore {
    async fn available_mentors(
        &self,
        exclude: &[Uuid],
        cap: i64,
    ) -> AppResult<Vec<MentorRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .mentors
            .iter()
            .filter(|m| !exclude.contains(&m.user_id))
            .take(cap as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GroupStore for FakeStore {
    async fn member_group_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .memberships
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(g, _)| *g)
            .collect())
    }

    async fn groups_joined_by(
        &self,
        user_ids: &[Uuid],
        cap: i64,
    ) -> AppResult<Vec<GroupRecord>> {
        let data = self.data.lock().unwrap();
        let joined: HashSet<Uuid> = data
            .memberships
            .iter()
            .filter(|(_, u)| user_ids.contains(u))
            .map(|(g, _)| *g)
            .collect();
        Ok(data
            .groups
            .iter()
            .filter(|g| joined.contains(&g.id))
            .take(cap as usize)
            .cloned()
            .collect())
    }

    async fn groups_matching_topics(
        &self,
        topics: &[String],
        cap: i64,
    ) -> AppResult<Vec<GroupRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .groups
            .iter()
            .filter(|g| g.topics.iter().any(|t| topics.contains(t)))
            .take(cap as usize)
            .cloned()
            .collect())
    }

    async fn co_members(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>> {
        let data = self.data.lock().unwrap();
        let own: HashSet<Uuid> = data
            .memberships
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(g, _)| *g)
            .collect();
        Ok(data
            .memberships
            .iter()
            .filter(|(g, u)| own.contains(g) && *u != user_id)
            .map(|(_, u)| *u)
            .take(cap as usize)
            .collect())
    }

    async fn cohort_member_count(&self, group_id: Uuid, cohort: &[Uuid]) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data
            .memberships
            .iter()
            .filter(|(g, u)| *g == group_id && cohort.contains(u))
            .count() as i64)
    }
}

#[async_trait]
impl PostStore for FakeStore {
    async fn liked_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let data = self.data.lock().unwrap();
        if data.fail_posts {
            return Err(AppError::Internal("post store unavailable".to_string()));
        }
        Ok(data
            .likes
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, e, at)| (*e, *at))
            .collect())
    }

    async fn commented_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .comments
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, e, at)| (*e, *at))
            .collect())
    }

    async fn shared_entity_ids(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(Uuid, DateTime<Utc>)>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .shares
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, e, at)| (*e, *at))
            .collect())
    }

    async fn recent_public_posts(
        &self,
        since: DateTime<Utc>,
        exclude_author: Uuid,
        cap: i64,
    ) -> AppResult<Vec<PostRecord>> {
        let data = self.data.lock().unwrap();
        if data.fail_posts {
            return Err(AppError::Internal("post store unavailable".to_string()));
        }
        Ok(data
            .posts
            .iter()
            .filter(|p| p.created_at >= since && p.author_id != exclude_author)
            .take(cap as usize)
            .cloned()
            .collect())
    }

    async fn co_likers(&self, user_id: Uuid, cap: i64) -> AppResult<Vec<Uuid>> {
        let data = self.data.lock().unwrap();
        let own: HashSet<Uuid> = data
            .likes
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, e, _)| *e)
            .collect();
        let mut seen = HashSet::new();
        Ok(data
            .likes
            .iter()
            .filter(|(u, e, _)| own.contains(e) && *u != user_id)
            .map(|(u, _, _)| *u)
            .filter(|u| seen.insert(*u))
            .take(cap as usize)
            .collect())
    }

    async fn cohort_like_count(&self, post_id: Uuid, cohort: &[Uuid]) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        let likers: HashSet<Uuid> = data
            .likes
            .iter()
            .filter(|(u, e, _)| *e == post_id && cohort.contains(u))
            .map(|(u, _, _)| *u)
            .collect();
        Ok(likers.len() as i64)
    }
}

#[async_trait]
impl CourseStore for FakeStore {
    async fn published_courses(
        &self,
        exclude: &[Uuid],
        cap: i64,
    ) -> AppResult<Vec<CourseRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .courses
            .iter()
            .filter(|c| !exclude.contains(&c.id))
            .take(cap as usize)
            .cloned()
            .collect())
    }

    async fn enrolled_course_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .enrollments
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(c, _)| *c)
            .collect())
    }

    async fn cohort_enrollment_count(
        &self,
        course_id: Uuid,
        cohort: &[Uuid],
    ) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data
            .enrollments
            .iter()
            .filter(|(c, u)| *c == course_id && cohort.contains(u))
            .count() as i64)
    }
}

/// Builds an engine over the fake store with test-friendly tunables.
pub fn engine_over(store: FakeStore) -> RecommendationEngine {
    engine_with_config(store, EngineConfig::default())
}

pub fn engine_with_config(store: FakeStore, config: EngineConfig) -> RecommendationEngine {
    let store = Arc::new(store);
    RecommendationEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        config,
    )
}

/// A user with the given attribute fields; everything else empty.
pub fn user(name: &str, skills: &[&str]) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        industry: None,
        location: None,
        region: None,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        interests: vec![],
        learning_goals: vec![],
        communities: vec![],
    }
}

pub fn accepted_connection(a: Uuid, b: Uuid) -> ConnectionRecord {
    ConnectionRecord {
        sender_id: a,
        receiver_id: b,
        accepted_at: Utc::now(),
    }
}
