pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, is_admin: bool, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            is_admin,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Token pair handed out on register and login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates HS256 tokens.
///
/// Access and refresh tokens are signed with different secrets, so a refresh
/// token can never be replayed as an access token.
#[derive(Clone)]
pub struct JwtManager {
    access_secret: String,
    refresh_secret: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl JwtManager {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_secret: config.secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_lifetime: Duration::minutes(config.access_expiry_minutes),
            refresh_lifetime: Duration::hours(config.refresh_expiry_hours),
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime.num_seconds()
    }

    pub fn generate_access_token(&self, user_id: i64, email: &str, is_admin: bool) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email.to_string(), is_admin, self.access_lifetime);
        sign(&claims, &self.access_secret)
    }

    pub fn generate_refresh_token(&self, user_id: i64, email: &str, is_admin: bool) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email.to_string(), is_admin, self.refresh_lifetime);
        sign(&claims, &self.refresh_secret)
    }

    pub fn generate_pair(&self, user_id: i64, email: &str, is_admin: bool) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id, email, is_admin)?,
            refresh_token: self.generate_refresh_token(user_id, email, is_admin)?,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        verify(token, &self.access_secret)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        verify(token, &self.refresh_secret)
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn verify(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_nbf = true;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid,
        })
}
