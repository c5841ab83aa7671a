use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::database::models::notification::{NewNotification, Notification, NotificationType};
use crate::database::repository::NotificationRepository;
use crate::error::ApiError;
use crate::utils::pagination::{PageRequest, Pagination};

use super::ServiceResult;

#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
}

/// Who did what to which resource, for fan-out into a notification row.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub recipient_id: i64,
    /// `None` for anonymous commenters
    pub actor_id: Option<i64>,
    pub actor_name: String,
    pub kind: NotificationType,
    pub post_id: i64,
    pub comment_id: Option<i64>,
}

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Record a notification. Self-notifications are skipped and storage
    /// failures are logged rather than failing the triggering action.
    pub async fn notify(&self, event: NotificationEvent) {
        if event.actor_id == Some(event.recipient_id) {
            return;
        }

        let (title, message) = describe(&event);
        let link = match event.comment_id {
            Some(comment_id) => format!("/posts/{}#comment-{}", event.post_id, comment_id),
            None => format!("/posts/{}", event.post_id),
        };

        let result = self
            .notifications
            .create(NewNotification {
                user_id: event.recipient_id,
                kind: event.kind,
                title,
                message,
                post_id: Some(event.post_id),
                comment_id: event.comment_id,
                actor_id: event.actor_id,
                link,
            })
            .await;

        if let Err(e) = result {
            warn!(
                "Failed to store {} notification for user {}: {}",
                event.kind.as_str(),
                event.recipient_id,
                e
            );
        }
    }

    pub async fn list(&self, user_id: i64, page: PageRequest) -> ServiceResult<NotificationList> {
        let (notifications, total) = self.notifications.list_for_user(user_id, &page).await?;
        Ok(NotificationList {
            notifications,
            pagination: Pagination::new(&page, total),
        })
    }

    pub async fn unread_count(&self, user_id: i64) -> ServiceResult<i64> {
        Ok(self.notifications.count_unread(user_id).await?)
    }

    pub async fn mark_read(&self, user_id: i64, id: i64) -> ServiceResult<()> {
        if !self.notifications.mark_read(id, user_id).await? {
            return Err(ApiError::not_found("Notification not found"));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: i64) -> ServiceResult<u64> {
        Ok(self.notifications.mark_all_read(user_id).await?)
    }
}

fn describe(event: &NotificationEvent) -> (String, String) {
    let who = &event.actor_name;
    match event.kind {
        NotificationType::CommentReply => ("New reply".to_string(), format!("{} replied to your comment", who)),
        NotificationType::PostComment => ("New comment".to_string(), format!("{} commented on your post", who)),
        NotificationType::CommentLike => ("Comment liked".to_string(), format!("{} liked your comment", who)),
        NotificationType::PostLike => ("Post liked".to_string(), format!("{} liked your post", who)),
        NotificationType::PostBookmark => ("Post bookmarked".to_string(), format!("{} bookmarked your post", who)),
    }
}
