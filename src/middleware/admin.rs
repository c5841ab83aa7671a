use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;

use super::auth::AuthUser;

/// Rejects callers whose token does not carry the admin flag.
/// Must run after `jwt_auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        None => Err(ApiError::unauthorized("Authentication required")),
        Some(user) if !user.is_admin => {
            tracing::warn!(user_id = user.user_id, "Non-admin attempted admin route");
            Err(ApiError::forbidden("Admin access required"))
        }
        Some(_) => Ok(next.run(request).await),
    }
}
