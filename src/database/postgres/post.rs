use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::DatabaseError;
use crate::database::models::post::{Post, PostCounter, PostDraft};
use crate::database::repository::{PostRepository, RepoResult};
use crate::utils::pagination::PageRequest;

use super::like_pattern;

/// Readers only see live, published posts whose publish time has passed.
/// Always bound as `$1`.
const VISIBLE: &str = "p.deleted_at IS NULL AND p.status = 'published' AND p.published_at <= $1";

const SLUG_TAKEN: &str = "Slug already exists";

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Page through visible posts matching an extra filter bound as `$2`.
    async fn page_visible<T>(
        &self,
        joins: &str,
        filter: &str,
        arg: Option<T>,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> RepoResult<(Vec<Post>, i64)>
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Clone + 'static,
    {
        let select = format!(
            "SELECT p.* FROM posts p {} WHERE {} {}
             ORDER BY p.published_at DESC, p.id DESC
             LIMIT {} OFFSET {}",
            joins,
            VISIBLE,
            filter,
            page.limit,
            page.offset()
        );
        let count = format!("SELECT COUNT(*) FROM posts p {} WHERE {} {}", joins, VISIBLE, filter);

        let mut rows = sqlx::query_as::<_, Post>(&select).bind(now);
        let mut total = sqlx::query_scalar::<_, i64>(&count).bind(now);
        if let Some(arg) = arg {
            rows = rows.bind(arg.clone());
            total = total.bind(arg);
        }

        let posts = rows.fetch_all(&self.pool).await?;
        let total = total.fetch_one(&self.pool).await?;
        Ok((posts, total))
    }

    async fn replace_tags(tx: &mut Transaction<'_, Postgres>, post_id: i64, tag_ids: &[i64]) -> RepoResult<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut **tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::bigint[])")
                .bind(post_id)
                .bind(tag_ids)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, draft: PostDraft) -> RepoResult<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (title, slug, content, excerpt, featured_image, status, published_at,
                                meta_title, meta_description, meta_keywords, author_id, category_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *",
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.featured_image)
        .bind(draft.status.as_str())
        .bind(draft.published_at)
        .bind(&draft.meta_title)
        .bind(&draft.meta_description)
        .bind(&draft.meta_keywords)
        .bind(draft.author_id)
        .bind(draft.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, SLUG_TAKEN))?;

        Self::replace_tags(&mut tx, post.id, &draft.tag_ids).await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn update(&self, id: i64, draft: PostDraft) -> RepoResult<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            "UPDATE posts
             SET title = $2, slug = $3, content = $4, excerpt = $5, featured_image = $6,
                 status = $7, published_at = $8, meta_title = $9, meta_description = $10,
                 meta_keywords = $11, category_id = $12, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.featured_image)
        .bind(draft.status.as_str())
        .bind(draft.published_at)
        .bind(&draft.meta_title)
        .bind(&draft.meta_description)
        .bind(&draft.meta_keywords)
        .bind(draft.category_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, SLUG_TAKEN))?
        .ok_or_else(|| DatabaseError::NotFound(format!("post {}", id)))?;

        Self::replace_tags(&mut tx, id, &draft.tag_ids).await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("UPDATE posts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("post {}", id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE slug = $1 AND deleted_at IS NULL")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn list_published(&self, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        self.page_visible::<i64>("", "", None, now, page).await
    }

    async fn search_published(&self, query: &str, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        self.page_visible(
            "",
            "AND (p.title ILIKE $2 OR p.content ILIKE $2 OR p.excerpt ILIKE $2)",
            Some(like_pattern(query)),
            now,
            page,
        )
        .await
    }

    async fn list_published_by_category(&self, category_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        self.page_visible("", "AND p.category_id = $2", Some(category_id), now, page)
            .await
    }

    async fn list_published_by_tag(&self, tag_id: i64, now: DateTime<Utc>, page: &PageRequest) -> RepoResult<(Vec<Post>, i64)> {
        self.page_visible(
            "JOIN post_tags pt ON pt.post_id = p.id",
            "AND pt.tag_id = $2",
            Some(tag_id),
            now,
            page,
        )
        .await
    }

    async fn tag_ids(&self, post_id: i64) -> RepoResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT tag_id FROM post_tags WHERE post_id = $1 ORDER BY tag_id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn adjust_counter(&self, id: i64, counter: PostCounter, delta: i32) -> RepoResult<i32> {
        let column = counter.column();
        let sql = format!(
            "UPDATE posts SET {col} = GREATEST({col} + $2, 0) WHERE id = $1 RETURNING {col}",
            col = column
        );
        sqlx::query_scalar::<_, i32>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("post {}", id)))
    }

    async fn log_view(&self, post_id: i64, ip_address: &str, user_agent: Option<&str>) -> RepoResult<()> {
        sqlx::query("INSERT INTO view_logs (post_id, ip_address, user_agent) VALUES ($1, $2, $3)")
            .bind(post_id)
            .bind(ip_address)
            .bind(user_agent)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_published(&self, now: DateTime<Utc>) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM posts p WHERE {}", VISIBLE);
        let total: i64 = sqlx::query_scalar(&sql).bind(now).fetch_one(&self.pool).await?;
        Ok(total)
    }
}
