use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "scheduled" => Ok(PostStatus::Scheduled),
            other => Err(format!("status must be one of draft, published, scheduled (got '{}')", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub like_count: i32,
    pub comment_count: i32,
    pub bookmark_count: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Published, live and not deleted.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none()
            && self.status == PostStatus::Published.as_str()
            && self.published_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Column values for insert and full update
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

/// Denormalized counters kept on the post row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Views,
    Likes,
    Comments,
    Bookmarks,
}

impl PostCounter {
    pub fn column(&self) -> &'static str {
        match self {
            PostCounter::Views => "view_count",
            PostCounter::Likes => "like_count",
            PostCounter::Comments => "comment_count",
            PostCounter::Bookmarks => "bookmark_count",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(status: &str, published_at: Option<DateTime<Utc>>) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: "t".into(),
            slug: "t".into(),
            content: "c".into(),
            excerpt: None,
            featured_image: None,
            status: status.into(),
            published_at,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            bookmark_count: 0,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            author_id: 1,
            category_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn visibility_requires_published_and_past_date() {
        let now = Utc::now();
        assert!(post("published", Some(now - Duration::minutes(1))).is_visible(now));
        assert!(!post("published", Some(now + Duration::minutes(1))).is_visible(now));
        assert!(!post("published", None).is_visible(now));
        assert!(!post("draft", Some(now - Duration::minutes(1))).is_visible(now));
    }

    #[test]
    fn parses_status() {
        assert_eq!("scheduled".parse::<PostStatus>(), Ok(PostStatus::Scheduled));
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
