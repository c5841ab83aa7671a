use axum::{extract::State, Extension};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam};
use crate::services::post_service::{CreatePostInput, PostView, UpdatePostInput};
use crate::state::AppState;

/// POST /api/v1/admin/posts - Author a post as the calling admin
pub async fn post_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(input): JsonBody<CreatePostInput>,
) -> ApiResult<PostView> {
    let post = state.posts.create(auth_user.user_id, input).await?;
    Ok(ApiResponse::created(post))
}

/// PUT /api/v1/admin/posts/:id - Partial update
pub async fn post_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<UpdatePostInput>,
) -> ApiResult<PostView> {
    let post = state.posts.update(id, auth_user.user_id, input).await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/v1/admin/posts/:id
pub async fn post_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Value> {
    state.posts.delete(id).await?;
    tracing::info!(admin_id = auth_user.user_id, post_id = id, "Admin deleted post");
    Ok(ApiResponse::message("Post deleted successfully"))
}
