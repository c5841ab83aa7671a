use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET /health - Liveness plus a database ping
///
/// 200 with `database: "ok"` when the pool answers, 503 otherwise.
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.pool {
        Some(pool) => match DatabaseManager::health_check(pool).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                Err("unavailable")
            }
        },
        None => Err("not configured"),
    };

    let (status, code, db) = match database {
        Ok(()) => ("ok", StatusCode::OK, "ok"),
        Err(reason) => ("degraded", StatusCode::SERVICE_UNAVAILABLE, reason),
    };

    (
        code,
        Json(json!({
            "status": status,
            "env": state.environment.as_str(),
            "database": db,
            "timestamp": chrono::Utc::now(),
        })),
    )
}
