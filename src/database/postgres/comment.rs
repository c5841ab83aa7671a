use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::comment::{Comment, NewComment};
use crate::database::repository::{CommentRepository, RepoResult};
use crate::utils::pagination::PageRequest;

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> RepoResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (content, post_id, parent_id, user_id, author_name, author_email, author_password)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&comment.content)
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.user_id)
        .bind(&comment.author_name)
        .bind(&comment.author_email)
        .bind(&comment.author_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = $1 AND deleted_at IS NULL ORDER BY created_at, id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn list_replies(&self, parent_id: i64) -> RepoResult<Vec<Comment>> {
        let replies = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE parent_id = $1 AND deleted_at IS NULL ORDER BY created_at, id",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(replies)
    }

    async fn update_content(&self, id: i64, content: &str) -> RepoResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, is_edited = TRUE, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("comment {}", id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = NOW()
             WHERE (id = $1 OR parent_id = $1) AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn adjust_like_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        sqlx::query("UPDATE comments SET like_count = GREATEST(like_count + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<Comment>, i64)> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((comments, self.count().await?))
    }

    async fn count(&self) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
