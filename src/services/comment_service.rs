use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::database::models::comment::{Comment, NewComment};
use crate::database::models::notification::NotificationType;
use crate::database::models::post::{Post, PostCounter};
use crate::database::repository::{CommentRepository, PostRepository, UserRepository};
use crate::error::ApiError;
use crate::utils::validator::is_valid_email;

use super::notification_service::{NotificationEvent, NotificationService};
use super::post_service::AuthorSummary;
use super::{max_chars, optional, required, Actor, ServiceResult};

const MIN_ANONYMOUS_PASSWORD: usize = 4;

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentInput {
    pub content: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentInput {
    pub content: String,
    pub author_password: Option<String>,
}

/// Body of DELETE; only anonymous authors need it
#[derive(Debug, Default, Deserialize)]
pub struct DeleteCommentInput {
    pub author_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<AuthorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<CommentView>>,
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comments,
            posts,
            users,
            notifications,
        }
    }

    /// Top-level comments, oldest first, each carrying its replies.
    pub async fn list_for_post(&self, post_id: i64) -> ServiceResult<Vec<CommentView>> {
        self.visible_post(post_id).await?;
        let comments = self.comments.list_for_post(post_id).await?;
        let authors = self.authors(&comments).await?;

        let mut replies: HashMap<i64, Vec<CommentView>> = HashMap::new();
        let mut roots = Vec::new();
        for comment in comments {
            let view = view_of(comment, &authors);
            match view.comment.parent_id {
                Some(parent_id) => replies.entry(parent_id).or_default().push(view),
                None => roots.push(view),
            }
        }

        for root in roots.iter_mut() {
            root.replies = Some(replies.remove(&root.comment.id).unwrap_or_default());
        }
        Ok(roots)
    }

    pub async fn replies(&self, id: i64) -> ServiceResult<Vec<CommentView>> {
        self.find(id).await?;
        let replies = self.comments.list_replies(id).await?;
        let authors = self.authors(&replies).await?;
        Ok(replies.into_iter().map(|c| view_of(c, &authors)).collect())
    }

    pub async fn create(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        input: CreateCommentInput,
        actor: Option<Actor>,
    ) -> ServiceResult<CommentView> {
        let content = valid_content(&input.content)?;
        let post = self.visible_post(post_id).await?;

        let parent = match parent_id {
            Some(parent_id) => {
                let parent = self.find(parent_id).await?;
                if parent.post_id != post_id {
                    return Err(ApiError::invalid_field("parent_id", "Parent comment belongs to another post"));
                }
                if parent.is_reply() {
                    return Err(ApiError::invalid_field("parent_id", "Replies cannot be nested"));
                }
                Some(parent)
            }
            None => None,
        };

        let (new_comment, actor_name) = match actor {
            Some(actor) => {
                let user = self
                    .users
                    .find_by_id(actor.user_id)
                    .await?
                    .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
                let comment = NewComment {
                    content,
                    post_id,
                    parent_id,
                    user_id: Some(user.id),
                    author_name: None,
                    author_email: None,
                    author_password: None,
                };
                (comment, user.nickname)
            }
            None => {
                let (name, email, password_hash) = anonymous_author(input)?;
                let comment = NewComment {
                    content,
                    post_id,
                    parent_id,
                    user_id: None,
                    author_name: Some(name.clone()),
                    author_email: email,
                    author_password: Some(password_hash),
                };
                (comment, name)
            }
        };

        let comment = self.comments.create(new_comment).await?;
        self.posts.adjust_counter(post_id, PostCounter::Comments, 1).await?;
        info!("Comment {} added to post {}", comment.id, post_id);

        let event = match &parent {
            Some(parent) => parent.user_id.map(|recipient_id| (recipient_id, NotificationType::CommentReply)),
            None => Some((post.author_id, NotificationType::PostComment)),
        };
        if let Some((recipient_id, kind)) = event {
            self.notifications
                .notify(NotificationEvent {
                    recipient_id,
                    actor_id: comment.user_id,
                    actor_name,
                    kind,
                    post_id,
                    comment_id: Some(comment.id),
                })
                .await;
        }

        let authors = self.authors(std::slice::from_ref(&comment)).await?;
        Ok(view_of(comment, &authors))
    }

    pub async fn update(&self, id: i64, input: UpdateCommentInput, actor: Option<Actor>) -> ServiceResult<CommentView> {
        let comment = self.find(id).await?;
        authorize(&comment, actor, input.author_password.as_deref(), false)?;

        let content = valid_content(&input.content)?;
        let updated = self.comments.update_content(id, &content).await?;
        let authors = self.authors(std::slice::from_ref(&updated)).await?;
        Ok(view_of(updated, &authors))
    }

    pub async fn delete(&self, id: i64, input: DeleteCommentInput, actor: Option<Actor>) -> ServiceResult<()> {
        let comment = self.find(id).await?;
        authorize(&comment, actor, input.author_password.as_deref(), true)?;
        self.remove(&comment).await
    }

    /// Soft delete a comment with its replies and fix the post's count.
    pub(crate) async fn remove(&self, comment: &Comment) -> ServiceResult<()> {
        let removed = self.comments.delete(comment.id).await?;
        let removed = i32::try_from(removed).unwrap_or(i32::MAX);
        self.posts
            .adjust_counter(comment.post_id, PostCounter::Comments, -removed)
            .await?;
        info!("Deleted comment {} ({} rows)", comment.id, removed);
        Ok(())
    }

    pub(crate) async fn find(&self, id: i64) -> ServiceResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))
    }

    async fn visible_post(&self, post_id: i64) -> ServiceResult<Post> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_visible(Utc::now()) => Ok(post),
            _ => Err(ApiError::not_found("Post not found")),
        }
    }

    async fn authors(&self, comments: &[Comment]) -> ServiceResult<HashMap<i64, AuthorSummary>> {
        let mut ids: Vec<i64> = comments.iter().filter_map(|c| c.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorSummary {
                        id: u.id,
                        nickname: u.nickname,
                        avatar_url: u.avatar_url,
                    },
                )
            })
            .collect())
    }
}

fn view_of(comment: Comment, authors: &HashMap<i64, AuthorSummary>) -> CommentView {
    CommentView {
        author: comment.user_id.and_then(|id| authors.get(&id).cloned()),
        comment,
        replies: None,
    }
}

fn valid_content(content: &str) -> ServiceResult<String> {
    let content = required(content, "content")?;
    max_chars(&content, 1000, "content")?;
    Ok(content)
}

/// Validate anonymous author fields, returning (name, email, password hash).
fn anonymous_author(input: CreateCommentInput) -> ServiceResult<(String, Option<String>, String)> {
    let name = required(input.author_name.as_deref().unwrap_or_default(), "author_name")?;
    max_chars(&name, 100, "author_name")?;

    let email = optional(input.author_email);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ApiError::invalid_field("author_email", "Invalid email format"));
        }
    }

    let password = input.author_password.unwrap_or_default();
    if password.chars().count() < MIN_ANONYMOUS_PASSWORD {
        return Err(ApiError::invalid_field(
            "author_password",
            format!("author_password must be at least {} characters", MIN_ANONYMOUS_PASSWORD),
        ));
    }

    Ok((name, email, hash_password(&password)?))
}

/// Owners may edit and delete; admins may only delete.
fn authorize(comment: &Comment, actor: Option<Actor>, password: Option<&str>, admin_allowed: bool) -> ServiceResult<()> {
    if admin_allowed && actor.map(|a| a.is_admin).unwrap_or(false) {
        return Ok(());
    }

    match (comment.user_id, comment.author_password.as_deref()) {
        (Some(owner_id), _) => {
            if actor.map(|a| a.user_id) == Some(owner_id) {
                Ok(())
            } else {
                Err(ApiError::forbidden("You can only modify your own comments"))
            }
        }
        (None, Some(hash)) => {
            let matches = match password {
                Some(password) => verify_password(password, hash)?,
                None => false,
            };
            if matches {
                Ok(())
            } else {
                Err(ApiError::forbidden("Invalid comment password"))
            }
        }
        (None, None) => Err(ApiError::forbidden("You can only modify your own comments")),
    }
}
