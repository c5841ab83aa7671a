use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::database::models::comment::Comment;
use crate::database::models::user::User;
use crate::database::repository::{CommentRepository, PostRepository, UserRepository};
use crate::error::ApiError;
use crate::utils::pagination::{PageRequest, Pagination};

use super::comment_service::CommentService;
use super::ServiceResult;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_users: i64,
    pub total_posts: i64,
    pub published_posts: i64,
    pub total_comments: i64,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

/// Moderation and site statistics for administrators
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    comment_service: CommentService,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        comment_service: CommentService,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
            comment_service,
        }
    }

    pub async fn dashboard(&self) -> ServiceResult<Dashboard> {
        let (total_users, total_posts, published_posts, total_comments) = futures::try_join!(
            self.users.count(),
            self.posts.count(),
            self.posts.count_published(Utc::now()),
            self.comments.count(),
        )?;

        Ok(Dashboard {
            total_users,
            total_posts,
            published_posts,
            total_comments,
        })
    }

    pub async fn list_users(&self, page: PageRequest) -> ServiceResult<UserList> {
        let (users, total) = self.users.list(&page).await?;
        Ok(UserList {
            users,
            pagination: Pagination::new(&page, total),
        })
    }

    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if user.is_admin {
            return Err(ApiError::forbidden("Cannot delete admin user"));
        }

        self.users.delete(id).await?;
        info!("Admin deleted user {} ({})", id, user.nickname);
        Ok(())
    }

    pub async fn list_comments(&self, page: PageRequest) -> ServiceResult<CommentList> {
        let (comments, total) = self.comments.list(&page).await?;
        Ok(CommentList {
            comments,
            pagination: Pagination::new(&page, total),
        })
    }

    pub async fn delete_comment(&self, id: i64) -> ServiceResult<()> {
        let comment = self.comment_service.find(id).await?;
        self.comment_service.remove(&comment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::comment_service::CreateCommentInput;
    use crate::services::post_service::CreatePostInput;
    use crate::testing::{seed_published_post, seed_user, MemoryStore};

    #[tokio::test]
    async fn dashboard_counts_only_live_published_posts() {
        let store = MemoryStore::new();
        let admin = store.admin_service();
        let author = seed_user(&store, "author@viblog.com", "author", true).await;
        seed_user(&store, "reader@viblog.com", "reader", false).await;
        let post = seed_published_post(&store, author.id, "Live").await;

        let draft = CreatePostInput {
            title: "Draft".into(),
            slug: None,
            content: "wip".into(),
            excerpt: None,
            featured_image: None,
            status: Some("draft".into()),
            published_at: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            category_id: None,
            tag_ids: vec![],
        };
        store.post_service().create(author.id, draft).await.unwrap();

        store
            .comment_service()
            .create(
                post.id,
                None,
                CreateCommentInput {
                    content: "hi".into(),
                    author_name: Some("guest".into()),
                    author_email: None,
                    author_password: Some("1234".into()),
                },
                None,
            )
            .await
            .unwrap();

        let dashboard = admin.dashboard().await.unwrap();
        assert_eq!(dashboard.total_users, 2);
        assert_eq!(dashboard.total_posts, 2);
        assert_eq!(dashboard.published_posts, 1);
        assert_eq!(dashboard.total_comments, 1);
    }

    #[tokio::test]
    async fn admins_cannot_be_deleted() {
        let store = MemoryStore::new();
        let admin = store.admin_service();
        let root = seed_user(&store, "admin@viblog.com", "admin", true).await;
        let reader = seed_user(&store, "reader@viblog.com", "reader", false).await;

        let err = admin.delete_user(root.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Cannot delete admin user");

        admin.delete_user(reader.id).await.unwrap();
        assert_eq!(admin.delete_user(reader.id).await.unwrap_err().status_code(), 404);

        let users = admin.list_users(PageRequest::default()).await.unwrap();
        assert_eq!(users.pagination.total, 1);
    }

    #[tokio::test]
    async fn deleting_a_comment_decrements_post_count() {
        let store = MemoryStore::new();
        let admin = store.admin_service();
        let author = seed_user(&store, "author@viblog.com", "author", true).await;
        let post = seed_published_post(&store, author.id, "Moderated").await;

        let comment = store
            .comment_service()
            .create(
                post.id,
                None,
                CreateCommentInput {
                    content: "spam".into(),
                    author_name: Some("bot".into()),
                    author_email: None,
                    author_password: Some("1234".into()),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(admin.list_comments(PageRequest::default()).await.unwrap().comments.len(), 1);

        admin.delete_comment(comment.comment.id).await.unwrap();
        assert_eq!(store.post(post.id).await.comment_count, 0);
        assert_eq!(admin.delete_comment(comment.comment.id).await.unwrap_err().status_code(), 404);
    }
}
