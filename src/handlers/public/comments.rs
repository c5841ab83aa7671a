// handlers/public/comments.rs - Comment threads
//
// Reads are open. Writes sit behind the comment rate limiter and accept
// either a bearer token or anonymous author fields.

use axum::{extract::State, Extension};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam};
use crate::services::comment_service::{CommentView, CreateCommentInput, DeleteCommentInput, UpdateCommentInput};
use crate::state::AppState;

/// GET /api/v1/comments/post/:post_id - Top-level comments with their replies
pub async fn post_comments_get(
    State(state): State<AppState>,
    PathParam(post_id): PathParam<i64>,
) -> ApiResult<Vec<CommentView>> {
    Ok(ApiResponse::success(state.comments.list_for_post(post_id).await?))
}

/// GET /api/v1/comments/:id/replies
pub async fn replies_get(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<Vec<CommentView>> {
    Ok(ApiResponse::success(state.comments.replies(id).await?))
}

/// POST /api/v1/comments/post/:post_id
pub async fn post_comments_post(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(post_id): PathParam<i64>,
    JsonBody(input): JsonBody<CreateCommentInput>,
) -> ApiResult<CommentView> {
    let actor = auth.map(|Extension(user)| user.actor());
    let comment = state.comments.create(post_id, None, input, actor).await?;
    Ok(ApiResponse::created(comment))
}

/// POST /api/v1/comments/:id/replies
pub async fn replies_post(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(parent_id): PathParam<i64>,
    JsonBody(input): JsonBody<CreateCommentInput>,
) -> ApiResult<CommentView> {
    let actor = auth.map(|Extension(user)| user.actor());
    let parent = state.comments.find(parent_id).await?;
    let reply = state
        .comments
        .create(parent.post_id, Some(parent.id), input, actor)
        .await?;
    Ok(ApiResponse::created(reply))
}

/// PUT /api/v1/comments/:id - Owner, or anonymous author with the password
pub async fn comment_put(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<UpdateCommentInput>,
) -> ApiResult<CommentView> {
    let actor = auth.map(|Extension(user)| user.actor());
    Ok(ApiResponse::success(state.comments.update(id, input, actor).await?))
}

/// DELETE /api/v1/comments/:id - Body `{"author_password"}` for anonymous comments
pub async fn comment_delete(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(id): PathParam<i64>,
    body: Option<JsonBody<DeleteCommentInput>>,
) -> ApiResult<Value> {
    let actor = auth.map(|Extension(user)| user.actor());
    let input = body.map(|JsonBody(input)| input).unwrap_or_default();
    state.comments.delete(id, input, actor).await?;
    Ok(ApiResponse::message("Comment deleted successfully"))
}
