use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::Dashboard;
use crate::state::AppState;

/// GET /api/v1/admin/dashboard - Site-wide counts
pub async fn dashboard_get(State(state): State<AppState>) -> ApiResult<Dashboard> {
    Ok(ApiResponse::success(state.admin.dashboard().await?))
}
