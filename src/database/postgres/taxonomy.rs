use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::category::Category;
use crate::database::models::tag::Tag;
use crate::database::repository::{CategoryRepository, RepoResult, TagRepository};

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Category already exists"))
    }

    async fn update(&self, id: i64, name: &str, slug: &str, description: Option<&str>) -> RepoResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, slug = $3, description = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Category already exists"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("category {}", id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("category {}", id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        sqlx::query("UPDATE categories SET post_count = GREATEST(post_count + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, name: &str, slug: &str) -> RepoResult<Tag> {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING *")
            .bind(name)
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, "Tag already exists"))
    }

    async fn update(&self, id: i64, name: &str, slug: &str) -> RepoResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = $2, slug = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Tag already exists"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("tag {}", id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("tag {}", id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ANY($1) ORDER BY name")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tags WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_slug(&self, slug: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tags WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list(&self) -> RepoResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn adjust_post_count(&self, id: i64, delta: i32) -> RepoResult<()> {
        sqlx::query("UPDATE tags SET post_count = GREATEST(post_count + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
