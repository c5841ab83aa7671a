use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{JwtManager, TokenPair};
use crate::database::models::user::{NewUser, ProfileChanges, User};
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::utils::validator::{is_strong_password, is_valid_email, is_valid_nickname, is_valid_url, PASSWORD_REQUIREMENTS};

use super::{max_chars, ServiceResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const NICKNAME_RULES: &str = "Nickname must be 2-20 characters of letters, numbers, '_' or '-'";

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    jwt: JwtManager,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtManager) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();
        let nickname = input.nickname.trim().to_string();

        if !is_valid_email(&email) {
            return Err(ApiError::invalid_field("email", "Invalid email format"));
        }
        if !is_strong_password(&input.password) {
            return Err(ApiError::invalid_field("password", PASSWORD_REQUIREMENTS));
        }
        if !is_valid_nickname(&nickname) {
            return Err(ApiError::invalid_field("nickname", NICKNAME_RULES));
        }

        if self.users.exists_by_email(&email).await? {
            return Err(ApiError::conflict("Email already exists"));
        }
        if self.users.exists_by_nickname(&nickname).await? {
            return Err(ApiError::conflict("Nickname already exists"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                nickname,
                is_admin: false,
            })
            .await?;

        info!("Registered user {} ({})", user.id, user.nickname);
        self.issue(user)
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::invalid_field("email", "Invalid email format"));
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(&input.password, &user.password)? {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let now = Utc::now();
        self.users.touch_last_login(user.id, now).await?;

        let mut user = user;
        user.last_login_at = Some(now);
        self.issue(user)
    }

    /// Trade a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<AccessTokenResponse> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;

        // The account may have been deleted since the token was issued
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        let access_token = self.jwt.generate_access_token(user.id, &user.email, user.is_admin)?;
        Ok(AccessTokenResponse {
            access_token,
            expires_in: self.jwt.access_lifetime_secs(),
        })
    }

    pub async fn profile(&self, user_id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(&self, user_id: i64, input: UpdateProfileInput) -> ServiceResult<User> {
        let current = self.profile(user_id).await?;
        let mut changes = ProfileChanges::default();

        if let Some(nickname) = input.nickname {
            let nickname = nickname.trim().to_string();
            if !is_valid_nickname(&nickname) {
                return Err(ApiError::invalid_field("nickname", NICKNAME_RULES));
            }
            if nickname != current.nickname {
                if self.users.exists_by_nickname(&nickname).await? {
                    return Err(ApiError::conflict("Nickname already exists"));
                }
                changes.nickname = Some(nickname);
            }
        }

        if let Some(avatar_url) = input.avatar_url {
            let avatar_url = avatar_url.trim().to_string();
            if !is_valid_url(&avatar_url) {
                return Err(ApiError::invalid_field("avatar_url", "Invalid URL format"));
            }
            changes.avatar_url = Some(avatar_url);
        }

        if let Some(bio) = input.bio {
            max_chars(&bio, 500, "bio")?;
            changes.bio = Some(bio);
        }

        Ok(self.users.update_profile(user_id, changes).await?)
    }

    fn issue(&self, user: User) -> ServiceResult<AuthResponse> {
        let tokens = self.jwt.generate_pair(user.id, &user.email, user.is_admin)?;
        Ok(AuthResponse {
            tokens,
            expires_in: self.jwt.access_lifetime_secs(),
            user,
        })
    }
}
