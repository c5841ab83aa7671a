use axum::{
    extract::{Request, State},
    http::header::USER_AGENT,
    Extension,
};

use crate::middleware::{request_ip, ApiResponse, ApiResult, AuthUser, PathParam};
use crate::services::post_service::{PostView, ViewOutcome};
use crate::state::AppState;

/// GET /api/v1/posts/:id - A single visible post
pub async fn post_get(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<PostView> {
    let viewer = auth.map(|Extension(user)| user.user_id);
    let post = state.posts.get(id, viewer).await?;
    Ok(ApiResponse::success(post))
}

/// POST /api/v1/posts/:id/view - Count a view, at most once per IP per day
pub async fn post_view(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    request: Request,
) -> ApiResult<ViewOutcome> {
    let ip = request_ip(&request);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let outcome = state.posts.record_view(id, &ip, user_agent).await?;
    Ok(ApiResponse::success(outcome))
}
