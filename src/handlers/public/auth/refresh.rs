use axum::extract::State;
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::user_service::AccessTokenResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh - Mint a new access token from a refresh token
pub async fn refresh_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshRequest>,
) -> ApiResult<AccessTokenResponse> {
    let response = state.users.refresh(&body.refresh_token).await?;
    Ok(ApiResponse::success(response))
}
