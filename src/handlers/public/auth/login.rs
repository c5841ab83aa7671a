use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::user_service::{AuthResponse, LoginInput};
use crate::state::AppState;

/// POST /api/v1/auth/login - Exchange credentials for a token pair
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> ApiResult<AuthResponse> {
    let response = state.users.login(input).await?;
    Ok(ApiResponse::success(response))
}
