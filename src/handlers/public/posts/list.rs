use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser, QueryParams};
use crate::services::post_service::PostList;
use crate::state::AppState;
use crate::utils::pagination::{PageQuery, PageRequest};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/posts - Published posts, newest first
pub async fn posts_get(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<PostList> {
    let viewer = auth.map(|Extension(user)| user.user_id);
    let posts = state.posts.list(query.into(), viewer).await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/v1/posts/search?q= - Title, excerpt and body search
pub async fn posts_search(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<PostList> {
    let viewer = auth.map(|Extension(user)| user.user_id);
    let page = PageRequest::new(query.page, query.limit);
    let posts = state.posts.search(&query.q, page, viewer).await?;
    Ok(ApiResponse::success(posts))
}
