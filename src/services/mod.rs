//! Use cases. Each service owns the repository handles it needs and returns
//! `ApiError` so handlers can propagate with `?`.

pub mod admin_service;
pub mod category_service;
pub mod comment_service;
pub mod interaction_service;
pub mod notification_service;
pub mod post_service;
pub mod tag_service;
pub mod user_service;

pub use admin_service::AdminService;
pub use category_service::CategoryService;
pub use comment_service::CommentService;
pub use interaction_service::InteractionService;
pub use notification_service::NotificationService;
pub use post_service::PostService;
pub use tag_service::TagService;
pub use user_service::UserService;

use crate::error::ApiError;

pub type ServiceResult<T> = Result<T, ApiError>;

/// The authenticated caller of a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub is_admin: bool,
}

/// Trim and reject blank input
pub(crate) fn required(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_field(field, format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim, turning blank strings into `None`
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn max_chars(value: &str, max: usize, field: &str) -> ServiceResult<()> {
    if value.chars().count() > max {
        return Err(ApiError::invalid_field(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}
