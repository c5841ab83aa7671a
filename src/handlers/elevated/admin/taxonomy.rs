use axum::extract::State;
use serde_json::Value;

use crate::database::models::{Category, Tag};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam};
use crate::services::category_service::CategoryInput;
use crate::services::tag_service::TagInput;
use crate::state::AppState;

/// GET /api/v1/admin/categories
pub async fn categories_get(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories.list().await?))
}

/// POST /api/v1/admin/categories - `{"name", "description"?}`, slug derived from name
pub async fn category_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> ApiResult<Category> {
    Ok(ApiResponse::created(state.categories.create(input).await?))
}

/// PUT /api/v1/admin/categories/:id
pub async fn category_put(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> ApiResult<Category> {
    Ok(ApiResponse::success(state.categories.update(id, input).await?))
}

/// DELETE /api/v1/admin/categories/:id - Posts keep existing, uncategorized
pub async fn category_delete(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<Value> {
    state.categories.delete(id).await?;
    Ok(ApiResponse::message("Category deleted successfully"))
}

/// GET /api/v1/admin/tags
pub async fn tags_get(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.tags.list().await?))
}

/// POST /api/v1/admin/tags
pub async fn tag_post(State(state): State<AppState>, JsonBody(input): JsonBody<TagInput>) -> ApiResult<Tag> {
    Ok(ApiResponse::created(state.tags.create(input).await?))
}

/// PUT /api/v1/admin/tags/:id
pub async fn tag_put(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<TagInput>,
) -> ApiResult<Tag> {
    Ok(ApiResponse::success(state.tags.update(id, input).await?))
}

/// DELETE /api/v1/admin/tags/:id
pub async fn tag_delete(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<Value> {
    state.tags.delete(id).await?;
    Ok(ApiResponse::message("Tag deleted successfully"))
}
