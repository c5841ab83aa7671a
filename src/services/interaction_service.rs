use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::database::models::interaction::LikeTarget;
use crate::database::models::notification::NotificationType;
use crate::database::models::post::{Post, PostCounter};
use crate::database::repository::{BookmarkRepository, CommentRepository, LikeRepository, PostRepository, UserRepository};
use crate::error::ApiError;

use super::notification_service::{NotificationEvent, NotificationService};
use super::{Actor, ServiceResult};

#[derive(Debug, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i32,
}

#[derive(Debug, Serialize)]
pub struct BookmarkOutcome {
    pub bookmarked: bool,
    pub bookmark_count: i32,
}

/// Likes and bookmarks, with the counters and notifications they drive.
#[derive(Clone)]
pub struct InteractionService {
    likes: Arc<dyn LikeRepository>,
    bookmarks: Arc<dyn BookmarkRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl InteractionService {
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        bookmarks: Arc<dyn BookmarkRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            likes,
            bookmarks,
            posts,
            comments,
            users,
            notifications,
        }
    }

    pub async fn like_post(&self, actor: Actor, post_id: i64) -> ServiceResult<LikeOutcome> {
        let post = self.visible_post(post_id).await?;
        self.likes.create(actor.user_id, LikeTarget::Post(post_id)).await?;
        let like_count = self.posts.adjust_counter(post_id, PostCounter::Likes, 1).await?;
        debug!("User {} liked post {}", actor.user_id, post_id);

        self.notify(actor, post.author_id, NotificationType::PostLike, post_id, None)
            .await;
        Ok(LikeOutcome {
            liked: true,
            like_count,
        })
    }

    pub async fn unlike_post(&self, actor: Actor, post_id: i64) -> ServiceResult<LikeOutcome> {
        self.visible_post(post_id).await?;
        if !self.likes.delete(actor.user_id, LikeTarget::Post(post_id)).await? {
            return Err(ApiError::not_found("Like not found"));
        }
        let like_count = self.posts.adjust_counter(post_id, PostCounter::Likes, -1).await?;
        Ok(LikeOutcome {
            liked: false,
            like_count,
        })
    }

    pub async fn like_comment(&self, actor: Actor, comment_id: i64) -> ServiceResult<LikeOutcome> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;

        self.likes.create(actor.user_id, LikeTarget::Comment(comment_id)).await?;
        self.comments.adjust_like_count(comment_id, 1).await?;

        if let Some(owner_id) = comment.user_id {
            self.notify(actor, owner_id, NotificationType::CommentLike, comment.post_id, Some(comment_id))
                .await;
        }
        self.comment_outcome(comment_id, true).await
    }

    pub async fn unlike_comment(&self, actor: Actor, comment_id: i64) -> ServiceResult<LikeOutcome> {
        if self.comments.find_by_id(comment_id).await?.is_none() {
            return Err(ApiError::not_found("Comment not found"));
        }
        if !self.likes.delete(actor.user_id, LikeTarget::Comment(comment_id)).await? {
            return Err(ApiError::not_found("Like not found"));
        }
        self.comments.adjust_like_count(comment_id, -1).await?;
        self.comment_outcome(comment_id, false).await
    }

    pub async fn bookmark(&self, actor: Actor, post_id: i64) -> ServiceResult<BookmarkOutcome> {
        let post = self.visible_post(post_id).await?;
        self.bookmarks.create(actor.user_id, post_id).await?;
        let bookmark_count = self.posts.adjust_counter(post_id, PostCounter::Bookmarks, 1).await?;

        self.notify(actor, post.author_id, NotificationType::PostBookmark, post_id, None)
            .await;
        Ok(BookmarkOutcome {
            bookmarked: true,
            bookmark_count,
        })
    }

    pub async fn unbookmark(&self, actor: Actor, post_id: i64) -> ServiceResult<BookmarkOutcome> {
        if !self.bookmarks.delete(actor.user_id, post_id).await? {
            return Err(ApiError::not_found("Bookmark not found"));
        }
        let bookmark_count = self.posts.adjust_counter(post_id, PostCounter::Bookmarks, -1).await?;
        Ok(BookmarkOutcome {
            bookmarked: false,
            bookmark_count,
        })
    }

    async fn visible_post(&self, post_id: i64) -> ServiceResult<Post> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_visible(Utc::now()) => Ok(post),
            _ => Err(ApiError::not_found("Post not found")),
        }
    }

    async fn comment_outcome(&self, comment_id: i64, liked: bool) -> ServiceResult<LikeOutcome> {
        let like_count = self
            .comments
            .find_by_id(comment_id)
            .await?
            .map(|c| c.like_count)
            .unwrap_or_default();
        Ok(LikeOutcome { liked, like_count })
    }

    async fn notify(
        &self,
        actor: Actor,
        recipient_id: i64,
        kind: NotificationType,
        post_id: i64,
        comment_id: Option<i64>,
    ) {
        if actor.user_id == recipient_id {
            return;
        }

        let actor_name = match self.users.find_by_id(actor.user_id).await {
            Ok(Some(user)) => user.nickname,
            _ => "Someone".to_string(),
        };

        self.notifications
            .notify(NotificationEvent {
                recipient_id,
                actor_id: Some(actor.user_id),
                actor_name,
                kind,
                post_id,
                comment_id,
            })
            .await;
    }
}
