use axum::{extract::State, Extension};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam, QueryParams};
use crate::services::admin_service::{CommentList, UserList};
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// GET /api/v1/admin/users
pub async fn users_get(State(state): State<AppState>, QueryParams(query): QueryParams<PageQuery>) -> ApiResult<UserList> {
    Ok(ApiResponse::success(state.admin.list_users(query.into()).await?))
}

/// DELETE /api/v1/admin/users/:id - Soft-delete a non-admin account
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Value> {
    state.admin.delete_user(id).await?;
    tracing::info!(admin_id = auth_user.user_id, user_id = id, "Admin deleted user");
    Ok(ApiResponse::message("User deleted successfully"))
}

/// GET /api/v1/admin/comments - All live comments, newest first
pub async fn comments_get(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<CommentList> {
    Ok(ApiResponse::success(state.admin.list_comments(query.into()).await?))
}

/// DELETE /api/v1/admin/comments/:id
pub async fn comment_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Value> {
    state.admin.delete_comment(id).await?;
    tracing::info!(admin_id = auth_user.user_id, comment_id = id, "Admin deleted comment");
    Ok(ApiResponse::message("Comment deleted successfully"))
}
