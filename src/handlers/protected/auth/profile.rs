use axum::{extract::State, Extension};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::services::user_service::UpdateProfileInput;
use crate::state::AppState;

/// GET /api/v1/auth/me - The caller's profile
pub async fn me_get(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<User> {
    let user = state.users.profile(auth_user.user_id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/me - Update nickname, avatar or bio
pub async fn me_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(input): JsonBody<UpdateProfileInput>,
) -> ApiResult<User> {
    let user = state.users.update_profile(auth_user.user_id, input).await?;
    Ok(ApiResponse::success(user))
}
