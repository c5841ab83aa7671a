//! Persistence contracts. Services only ever see these traits; Postgres
//! implementations live in `database::postgres`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::category::Category;
use crate::database::models::comment::{Comment, NewComment};
use crate::database::models::interaction::{Bookmark, Like, LikeTarget};
use crate::database::models::notification::{NewNotification, Notification};
use crate::database::models::post::{Post, PostCounter, PostDraft};
use crate::database::models::tag::Tag;
use crate::database::models::user::{NewUser, ProfileChanges, User};
use crate::utils::pagination::PageRequest;

pub type RepoResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<User>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
    async fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool>;
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<User>;
    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()>;
    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<User>, i64)>;
    async fn count(&self) -> RepoResult<i64>;
    /// Soft delete
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, draft: PostDraft) -> RepoResult<Post>;
    async fn update(&self, id: i64, draft: PostDraft) -> RepoResult<Post>;
    /// Soft delete
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Post>>;
    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Post>>;
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
    async fn list_published(&self, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)>;
    async fn search_published(&self, query: &str, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)>;
    async fn list_published_by_category(&self, category_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)>;
    async fn list_published_by_tag(&self, tag_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)>;
    async fn tag_ids(&self, post_id: i64) -> RepoResult<Vec<i64>>;
    /// Returns the counter's new value, floored at zero.
    async fn adjust_counter(&self, id: i64, counter: PostCounter, delta: i32) -> RepoResult<i32>;
    async fn log_view(&self, post_id: i64, ip_address: &str, user_agent: Option<&str>) -> RepoResult<()>;
    async fn count(&self) -> RepoResult<i64>;
    async fn count_published(&self, now: DateTime<Utc>) -> RepoResult<i64>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category>;
    async fn update(&self, id: i64, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    async fn exists_by_name(&self, name: &str) -> RepoResult<bool>;
    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool>;
    async fn list(&self) -> RepoResult<Vec<Category>>;
    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, name: &str, slug: &str) -> RepoResult<Tag>;
    async fn update(&self, id: i64, name: &str, slug: &str) -> RepoResult<Tag>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>>;
    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Tag>>;
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>>;
    async fn exists_by_name(&self, name: &str) -> RepoResult<bool>;
    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool>;
    async fn list(&self) -> RepoResult<Vec<Tag>>;
    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> RepoResult<Comment>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>>;
    /// Every live comment on a post, oldest first
    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<Comment>>;
    async fn list_replies(&self, parent_id: i64) -> RepoResult<Vec<Comment>>;
    async fn update_content(&self, id: i64, content: &str) -> RepoResult<Comment>;
    /// Soft deletes the comment and its replies, returning how many rows went away.
    async fn delete(&self, id: i64) -> RepoResult<u64>;
    async fn adjust_like_count(&self, id: i64, delta: i32) -> RepoResult<()>;
    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<Comment>, i64)>;
    async fn count(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn create(&self, user_id: i64, target: LikeTarget) -> RepoResult<Like>;
    /// Returns false when nothing was liked
    async fn delete(&self, user_id: i64, target: LikeTarget) -> RepoResult<bool>;
    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>>;
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn create(&self, user_id: i64, post_id: i64) -> RepoResult<Bookmark>;
    async fn delete(&self, user_id: i64, post_id: i64) -> RepoResult<bool>;
    async fn bookmarked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>>;
    /// Ids of bookmarked posts still visible at `now`, newest bookmark first
    async fn list_post_ids(&self, user_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<i64>, i64)>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> RepoResult<Notification>;
    async fn list_for_user(&self, user_id: i64, page: &PageRequest) -> RepoResult<(Vec<Notification>, i64)>;
    async fn count_unread(&self, user_id: i64) -> RepoResult<i64>;
    /// Returns false when the notification does not belong to the user
    async fn mark_read(&self, id: i64, user_id: i64) -> RepoResult<bool>;
    async fn mark_all_read(&self, user_id: i64) -> RepoResult<u64>;
}
