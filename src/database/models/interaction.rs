use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A like on either a post or a comment, never both
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Post(i64),
    Comment(i64),
}
