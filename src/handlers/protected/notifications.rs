// handlers/protected/notifications.rs - The caller's inbox

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam, QueryParams};
use crate::services::notification_service::NotificationList;
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// GET /api/v1/notifications
pub async fn notifications_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<NotificationList> {
    let list = state.notifications.list(auth_user.user_id, query.into()).await?;
    Ok(ApiResponse::success(list))
}

/// GET /api/v1/notifications/unread - `{count}`
pub async fn unread_get(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let count = state.notifications.unread_count(auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// PUT /api/v1/notifications/:id/read
pub async fn read_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Value> {
    state.notifications.mark_read(auth_user.user_id, id).await?;
    Ok(ApiResponse::message("Notification marked as read"))
}

/// PUT /api/v1/notifications/read-all
pub async fn read_all_put(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let updated = state.notifications.mark_all_read(auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}
