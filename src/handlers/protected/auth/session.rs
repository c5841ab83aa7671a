use axum::Extension;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/v1/auth/logout
///
/// Tokens are stateless; the client discards them. Kept so clients have a
/// single place to hook sign-out.
pub async fn logout_post(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(ApiResponse::message("Logged out successfully"))
}
