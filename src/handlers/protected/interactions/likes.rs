use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam};
use crate::services::interaction_service::LikeOutcome;
use crate::state::AppState;

/// POST /api/v1/posts/:id/like
pub async fn post_like_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<LikeOutcome> {
    let outcome = state.interactions.like_post(auth_user.actor(), id).await?;
    Ok(ApiResponse::created(outcome))
}

/// DELETE /api/v1/posts/:id/like
pub async fn post_like_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<LikeOutcome> {
    let outcome = state.interactions.unlike_post(auth_user.actor(), id).await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /api/v1/comments/:id/like
pub async fn comment_like_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<LikeOutcome> {
    let outcome = state.interactions.like_comment(auth_user.actor(), id).await?;
    Ok(ApiResponse::created(outcome))
}

/// DELETE /api/v1/comments/:id/like
pub async fn comment_like_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<LikeOutcome> {
    let outcome = state.interactions.unlike_comment(auth_user.actor(), id).await?;
    Ok(ApiResponse::success(outcome))
}
