use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::interaction::{Bookmark, Like, LikeTarget};
use crate::database::repository::{BookmarkRepository, LikeRepository, RepoResult};
use crate::utils::pagination::PageRequest;

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn columns(target: LikeTarget) -> (Option<i64>, Option<i64>) {
    match target {
        LikeTarget::Post(id) => (Some(id), None),
        LikeTarget::Comment(id) => (None, Some(id)),
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn create(&self, user_id: i64, target: LikeTarget) -> RepoResult<Like> {
        let (post_id, comment_id) = columns(target);
        sqlx::query_as::<_, Like>(
            "INSERT INTO likes (user_id, post_id, comment_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Already liked"))
    }

    async fn delete(&self, user_id: i64, target: LikeTarget) -> RepoResult<bool> {
        let sql = match target {
            LikeTarget::Post(_) => "DELETE FROM likes WHERE user_id = $1 AND post_id = $2",
            LikeTarget::Comment(_) => "DELETE FROM likes WHERE user_id = $1 AND comment_id = $2",
        };
        let (LikeTarget::Post(id) | LikeTarget::Comment(id)) = target;

        let result = sqlx::query(sql).bind(user_id).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT post_id FROM likes WHERE user_id = $1 AND post_id = ANY($2)")
            .bind(user_id)
            .bind(post_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn create(&self, user_id: i64, post_id: i64) -> RepoResult<Bookmark> {
        sqlx::query_as::<_, Bookmark>("INSERT INTO bookmarks (user_id, post_id) VALUES ($1, $2) RETURNING *")
            .bind(user_id)
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, "Already bookmarked"))
    }

    async fn delete(&self, user_id: i64, post_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bookmarked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> RepoResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT post_id FROM bookmarks WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn list_post_ids(&self, user_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<i64>, i64)> {
        // Bookmarks of deleted, draft or not-yet-published posts are hidden
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT b.post_id FROM bookmarks b
             JOIN posts p ON p.id = b.post_id
             WHERE b.user_id = $1
               AND p.deleted_at IS NULL AND p.status = 'published' AND p.published_at <= $2
             ORDER BY b.created_at DESC, b.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(now)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookmarks b
             JOIN posts p ON p.id = b.post_id
             WHERE b.user_id = $1
               AND p.deleted_at IS NULL AND p.status = 'published' AND p.published_at <= $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok((ids, total))
    }
}
