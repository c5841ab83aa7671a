use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam, QueryParams};
use crate::services::interaction_service::BookmarkOutcome;
use crate::services::post_service::PostList;
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// POST /api/v1/posts/:id/bookmark
pub async fn bookmark_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<BookmarkOutcome> {
    let outcome = state.interactions.bookmark(auth_user.actor(), id).await?;
    Ok(ApiResponse::created(outcome))
}

/// DELETE /api/v1/posts/:id/bookmark
pub async fn bookmark_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<BookmarkOutcome> {
    let outcome = state.interactions.unbookmark(auth_user.actor(), id).await?;
    Ok(ApiResponse::success(outcome))
}

/// GET /api/v1/bookmarks - The caller's bookmarked posts, most recent first
pub async fn bookmarks_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<PostList> {
    let posts = state.posts.list_bookmarked(auth_user.user_id, query.into()).await?;
    Ok(ApiResponse::success(posts))
}
