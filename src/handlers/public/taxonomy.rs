// handlers/public/taxonomy.rs - Category and tag browsing

use axum::{extract::State, Extension};

use crate::database::models::{Category, Tag};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam, QueryParams};
use crate::services::post_service::PostList;
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// GET /api/v1/categories
pub async fn categories_get(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories.list().await?))
}

/// GET /api/v1/categories/:slug/posts
pub async fn category_posts_get(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(slug): PathParam<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<PostList> {
    let viewer = auth.map(|Extension(user)| user.user_id);
    let posts = state.posts.list_by_category(&slug, query.into(), viewer).await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/v1/tags
pub async fn tags_get(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.tags.list().await?))
}

/// GET /api/v1/tags/:slug/posts
pub async fn tag_posts_get(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    PathParam(slug): PathParam<String>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<PostList> {
    let viewer = auth.map(|Extension(user)| user.user_id);
    let posts = state.posts.list_by_tag(&slug, query.into(), viewer).await?;
    Ok(ApiResponse::success(posts))
}
