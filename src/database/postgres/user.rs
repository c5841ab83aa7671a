use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::user::{NewUser, ProfileChanges, User};
use crate::database::repository::{RepoResult, UserRepository};
use crate::utils::pagination::PageRequest;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password, nickname, is_admin)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Email or nickname already exists"))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1 AND deleted_at IS NULL)")
                .bind(nickname)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users
             SET nickname = COALESCE($2, nickname),
                 avatar_url = COALESCE($3, avatar_url),
                 bio = COALESCE($4, bio),
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(id)
        .bind(changes.nickname)
        .bind(changes.avatar_url)
        .bind(changes.bio)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "Nickname already exists"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
    }

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: &PageRequest) -> RepoResult<(Vec<User>, i64)> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((users, self.count().await?))
    }

    async fn count(&self) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
