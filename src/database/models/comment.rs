use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: Option<i64>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    /// bcrypt hash guarding edits of anonymous comments
    #[serde(skip_serializing)]
    pub author_password: Option<String>,
    pub like_count: i32,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: Option<i64>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_password: Option<String>,
}
