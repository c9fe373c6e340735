use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user as read from the store, with the attribute fields the
/// content-based signals compare against.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub learning_goals: Vec<String>,
    pub communities: Vec<String>,
}

/// An accepted bidirectional connection. Either side may be the subject;
/// callers normalize by picking whichever id is not theirs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConnectionRecord {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// The id on the other side of the connection from `user_id`.
    pub fn other_side(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

/// An approved, available mentor.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MentorRecord {
    pub user_id: Uuid,
    pub display_name: String,
    pub industry: Option<String>,
    pub expertise: Vec<String>,
    /// Average rating on a 0-5 scale.
    pub rating: f64,
    pub active_sessions: i32,
    pub max_sessions: i32,
    pub last_active_at: DateTime<Utc>,
}

/// A group the subject could join.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    pub topics: Vec<String>,
    pub communities: Vec<String>,
    pub member_count: i64,
    /// Posts plus comments over the trailing week.
    pub weekly_activity: i64,
    pub last_active_at: DateTime<Utc>,
}

/// A publicly visible content post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub topics: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub created_at: DateTime<Utc>,
}

impl PostRecord {
    pub fn total_engagement(&self) -> i64 {
        self.like_count + self.comment_count + self.share_count
    }
}

/// A published course.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseRecord {
    pub id: Uuid,
    pub title: String,
    pub skills: Vec<String>,
    pub topics: Vec<String>,
    pub enrollment_count: i64,
    pub published_at: DateTime<Utc>,
}
