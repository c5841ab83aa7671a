use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::user_service::{AuthResponse, RegisterInput};
use crate::state::AppState;

/// POST /api/v1/auth/register - Create an account and sign it in
///
/// Body: `{"email", "password", "nickname"}`. Responds 201 with the token
/// pair and the new user.
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult<AuthResponse> {
    let response = state.users.register(input).await?;
    Ok(ApiResponse::created(response))
}
