//! Postgres implementations of the repository traits.
//!
//! Queries are checked at runtime (`query_as::<_, T>`) so the crate builds
//! without a live database.

mod comment;
mod interaction;
mod notification;
mod post;
mod taxonomy;
mod user;

pub use comment::PgCommentRepository;
pub use interaction::{PgBookmarkRepository, PgLikeRepository};
pub use notification::PgNotificationRepository;
pub use post::PgPostRepository;
pub use taxonomy::{PgCategoryRepository, PgTagRepository};
pub use user::PgUserRepository;

/// Escape LIKE wildcards so user input matches literally.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
