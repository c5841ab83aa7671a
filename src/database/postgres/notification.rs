use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::notification::{NewNotification, Notification};
use crate::database::repository::{NotificationRepository, RepoResult};
use crate::utils::pagination::PageRequest;

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: NewNotification) -> RepoResult<Notification> {
        let created = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, type, title, message, post_id, comment_id, actor_id, link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.post_id)
        .bind(notification.comment_id)
        .bind(notification.actor_id)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_for_user(&self, user_id: i64, page: &PageRequest) -> RepoResult<(Vec<Notification>, i64)> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((notifications, total))
    }

    async fn count_unread(&self, user_id: i64) -> RepoResult<i64> {
        let unread: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(unread)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW()
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
